//! Battle composition: the authoritative state, intents and the shared engine

pub mod engine;
pub mod events;
pub mod intent;
pub mod scenario;
pub mod state;

pub use engine::{BattleEngine, IntentSender};
pub use events::{BattleEvent, BattleEventLog, BattleEventType, BattleOutcome, BattlePhase};
pub use intent::{Intent, IntentOutcome};
pub use scenario::{EntitySpec, Scenario, StyleSpec, TerrainSpec};
pub use state::{Battle, EntityView, OccupancyEntry, TurnInfo};
