//! Readiness scheduler
//!
//! Waiting entities fill their pos by `speed * dt * k` per tick. At the
//! threshold they queue up as Ready; the queue is ordered by pos, then by the
//! order they became ready. Only one entity acts at a time and nobody gains
//! readiness while it does.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::core::config::SchedulerConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{EntityId, Tick};
use crate::entity::Roster;

/// Float slack when comparing accumulated pos against the threshold
const READY_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    Waiting,
    Ready,
    Acting,
}

/// Per-entity readiness, mirrored to observers for progress bars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessFragment {
    pub id: EntityId,
    pub speed: u32,
    pub pos: f32,
    pub state: TurnState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    BecameReady { id: EntityId, tick: Tick },
    TurnStarted { id: EntityId, tick: Tick },
    TurnEnded { id: EntityId, spent: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadyEntry {
    id: EntityId,
    pos: OrderedFloat<f32>,
    seq: u64,
}

impl Ord for ReadyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher pos first, then lower sequence
        self.pos
            .cmp(&other.pos)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The entity currently holding the turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActingTurn {
    pub id: EntityId,
    pub spent: f32,
    /// Any action taken this turn, including ones that cost no pos
    pub acted: bool,
}

#[derive(Debug, Clone)]
pub struct ReadinessScheduler {
    k: f32,
    threshold: f32,
    states: HashMap<EntityId, TurnState>,
    ready: BinaryHeap<ReadyEntry>,
    next_seq: u64,
    acting: Option<ActingTurn>,
    tick: Tick,
}

impl ReadinessScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            k: config.readiness_k,
            threshold: config.ready_threshold,
            states: HashMap::new(),
            ready: BinaryHeap::new(),
            next_seq: 0,
            acting: None,
            tick: 0,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Start tracking an entity as Waiting
    pub fn enroll(&mut self, id: EntityId) {
        self.states.entry(id).or_insert(TurnState::Waiting);
    }

    /// Stop tracking an entity (death or departure)
    pub fn remove(&mut self, id: EntityId) {
        self.states.remove(&id);
        if self.acting.is_some_and(|turn| turn.id == id) {
            self.acting = None;
        }
        // Queue entries for the id are skipped lazily on pop
    }

    pub fn state(&self, id: EntityId) -> Option<TurnState> {
        self.states.get(&id).copied()
    }

    pub fn acting(&self) -> Option<ActingTurn> {
        self.acting
    }

    pub fn is_acting(&self, id: EntityId) -> bool {
        self.acting.is_some_and(|turn| turn.id == id)
    }

    /// Fail unless `id` holds the turn
    pub fn ensure_acting(&self, id: EntityId) -> Result<()> {
        if self.is_acting(id) {
            Ok(())
        } else {
            Err(BattleError::NotYourTurn(id))
        }
    }

    /// Advance readiness by `dt` seconds
    ///
    /// A no-op while someone is acting.
    pub fn tick(&mut self, dt: f32, roster: &mut Roster) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        if self.acting.is_some() {
            return events;
        }

        self.tick += 1;
        let ids: Vec<EntityId> = roster.ids().to_vec();

        for id in ids {
            if self.states.get(&id) != Some(&TurnState::Waiting) {
                continue;
            }
            let Ok(entity) = roster.get_mut(id) else {
                continue;
            };
            if entity.is_dead() {
                continue;
            }

            let gain = entity.speed() as f32 * dt * self.k;
            let max = entity.maxima();
            entity.pools.gain_pos(gain, &max);

            if entity.pools.pos + READY_EPSILON >= self.threshold {
                let pos = entity.pools.pos;
                self.states.insert(id, TurnState::Ready);
                self.ready.push(ReadyEntry {
                    id,
                    pos: OrderedFloat(pos),
                    seq: self.next_seq,
                });
                self.next_seq += 1;
                events.push(SchedulerEvent::BecameReady {
                    id,
                    tick: self.tick,
                });
            }
        }

        events
    }

    /// Hand the turn to the best ready entity, if nobody holds it
    pub fn begin_next_turn(&mut self, roster: &Roster) -> Option<SchedulerEvent> {
        if self.acting.is_some() {
            return None;
        }

        while let Some(entry) = self.ready.pop() {
            if self.states.get(&entry.id) != Some(&TurnState::Ready) {
                continue;
            }
            if roster.get(entry.id).map_or(true, |entity| entity.is_dead()) {
                self.states.remove(&entry.id);
                continue;
            }

            self.states.insert(entry.id, TurnState::Acting);
            self.acting = Some(ActingTurn {
                id: entry.id,
                spent: 0.0,
                acted: false,
            });
            return Some(SchedulerEvent::TurnStarted {
                id: entry.id,
                tick: self.tick,
            });
        }

        None
    }

    /// Note an action by the acting entity and the pos it cost
    pub fn record_action(&mut self, id: EntityId, pos_cost: f32) {
        if let Some(turn) = self.acting.as_mut() {
            if turn.id == id {
                turn.spent += pos_cost;
                turn.acted = true;
            }
        }
    }

    /// Close the acting entity's turn
    ///
    /// Costs paid during the turn already came out of pos; an entity that
    /// took no action passes and drops to zero.
    pub fn end_turn(&mut self, id: EntityId, roster: &mut Roster) -> Result<SchedulerEvent> {
        self.ensure_acting(id)?;
        let (spent, acted) = self
            .acting
            .map(|turn| (turn.spent, turn.acted))
            .unwrap_or((0.0, false));

        if !acted {
            if let Ok(entity) = roster.get_mut(id) {
                entity.pools.pos = 0.0;
            }
        }

        self.acting = None;
        self.states.insert(id, TurnState::Waiting);
        Ok(SchedulerEvent::TurnEnded { id, spent })
    }

    /// Drop the open turn without charging anyone
    pub fn halt(&mut self) -> Option<ActingTurn> {
        let turn = self.acting.take()?;
        self.states.insert(turn.id, TurnState::Waiting);
        Some(turn)
    }

    /// Readiness of every tracked living entity, in join order
    pub fn fragments(&self, roster: &Roster) -> Vec<ReadinessFragment> {
        roster
            .living()
            .filter_map(|entity| {
                self.states.get(&entity.id).map(|state| ReadinessFragment {
                    id: entity.id,
                    speed: entity.speed(),
                    pos: entity.pools.pos,
                    state: *state,
                })
            })
            .collect()
    }
}
