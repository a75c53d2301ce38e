//! Battle phases, outcome and the event log

use serde::{Deserialize, Serialize};

use crate::ability::AbilityKey;
use crate::core::types::{EntityId, TeamId, Tick};
use crate::grid::HexCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattleOutcome {
    #[default]
    Undecided,
    Victory { team: TeamId },
    /// Nobody left standing
    Draw,
}

/// Log entry for battle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub tick: Tick,
    pub event_type: BattleEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    EntityJoined { entity: EntityId, team: TeamId },
    TurnStarted { entity: EntityId },
    TurnEnded { entity: EntityId, spent: f32 },
    AbilitySelected { entity: EntityId, key: AbilityKey },
    Clash { attacker: EntityId, target: EntityId, damage: u32, hit: bool },
    Moved { entity: EntityId, from: HexCoord, to: HexCoord, cost: f32 },
    StyleSwitched { entity: EntityId, index: usize, cost: f32 },
    EntityDied { entity: EntityId },
    BattleEnded { outcome: BattleOutcome },
}

/// Append-only record of what happened
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String, tick: Tick) {
        self.events.push(BattleEvent {
            tick,
            event_type,
            description,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&BattleEvent> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    /// Events at or after `tick`
    pub fn since(&self, tick: Tick) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter().filter(move |event| event.tick >= tick)
    }
}
