//! Entity resource model: stats, derived pools and fighting styles

pub mod combatant;
pub mod resources;
pub mod roster;
pub mod stats;
pub mod style;

pub use combatant::{Entity, ResourceSnapshot};
pub use resources::ResourcePools;
pub use roster::Roster;
pub use stats::{ResourceMaxima, StatBlock, POS_MAX};
pub use style::FightingStyle;
