use thiserror::Error;

use crate::core::types::EntityId;
use crate::grid::HexCoord;
use crate::lock::LockCategory;

/// Which pool came up short when a cost could not be paid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Pos,
    Mana,
}

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Insufficient {kind:?}: need {required}, have {available}")]
    InsufficientResource {
        kind: ResourceKind,
        required: f32,
        available: f32,
    },

    #[error("Target at distance {distance} outside range {min}..={max}")]
    OutOfRange { distance: u32, min: u32, max: u32 },

    #[error("Cell {0:?} is occupied")]
    CellOccupied(HexCoord),

    #[error("No path to {0:?}")]
    Unreachable(HexCoord),

    #[error("Invalid fighting style index {index} (have {count})")]
    InvalidStyleIndex { index: usize, count: usize },

    #[error("Fighting style {0} is already active")]
    StyleAlreadyActive(usize),

    #[error("Action category {0:?} is locked")]
    AlreadyLocked(LockCategory),

    #[error("Entity not found: {0}")]
    ActorNotFound(EntityId),

    #[error("Entity {0} is dead")]
    EntityDead(EntityId),

    #[error("Entity {0} is not the acting entity")]
    NotYourTurn(EntityId),

    #[error("No ability bound to key {0:?}")]
    UnknownAbilityKey(crate::ability::AbilityKey),

    #[error("Unknown ability: {0}")]
    UnknownAbility(String),

    #[error("Ability {0} is passive and cannot be used")]
    PassiveAbility(String),

    #[error("No target at {0:?}")]
    NoTarget(HexCoord),

    #[error("Battle is over")]
    BattleOver,

    #[error("Battle engine is no longer accepting intents")]
    EngineStopped,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
