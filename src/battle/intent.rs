//! Inbound intents and what they produce

use serde::{Deserialize, Serialize};

use crate::ability::AbilityKey;
use crate::combat::ClashResult;
use crate::core::types::EntityId;
use crate::grid::HexCoord;
use crate::lock::LockCategory;

/// A request from the input layer, always on behalf of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    SelectAbility {
        entity: EntityId,
        key: AbilityKey,
    },
    SubmitAttack {
        entity: EntityId,
        key: AbilityKey,
        target: HexCoord,
    },
    /// Same numbers as a submit, nothing committed
    PreviewAttack {
        entity: EntityId,
        key: AbilityKey,
        target: HexCoord,
    },
    RequestMove {
        entity: EntityId,
        to: HexCoord,
    },
    SwitchFightingStyle {
        entity: EntityId,
        index: usize,
    },
    EndTurn {
        entity: EntityId,
    },
}

impl Intent {
    pub fn entity(&self) -> EntityId {
        match self {
            Intent::SelectAbility { entity, .. }
            | Intent::SubmitAttack { entity, .. }
            | Intent::PreviewAttack { entity, .. }
            | Intent::RequestMove { entity, .. }
            | Intent::SwitchFightingStyle { entity, .. }
            | Intent::EndTurn { entity } => *entity,
        }
    }

    /// Lock category the intent is serialized under
    pub fn category(&self) -> LockCategory {
        match self {
            Intent::SelectAbility { .. } | Intent::PreviewAttack { .. } => {
                LockCategory::AbilitySelection
            }
            Intent::SubmitAttack { .. } => LockCategory::Attack,
            Intent::RequestMove { .. } => LockCategory::Movement,
            Intent::SwitchFightingStyle { .. } => LockCategory::StyleSwitch,
            Intent::EndTurn { .. } => LockCategory::Global,
        }
    }
}

/// Result handed back for an accepted intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntentOutcome {
    AbilitySelected { key: AbilityKey },
    Clash(ClashResult),
    Preview(ClashResult),
    Moved { path: Vec<HexCoord>, cost: f32 },
    StyleSwitched { index: usize, cost: f32 },
    TurnEnded { spent: f32 },
    /// Dropped inside the selection debounce window
    Debounced,
}
