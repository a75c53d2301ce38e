pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{BattleError, ResourceKind, Result};
pub use types::{EntityId, TeamId, Tick};
