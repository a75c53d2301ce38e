//! Hex Skirmish - turn-based tactical combat on a hex grid
//!
//! Entities fill a readiness pool by speed, act when it is full, and spend it
//! on abilities, movement and style switches. One authoritative battle is
//! mutated through intents and mirrored to observers as versioned diffs.

pub mod ability;
pub mod battle;
pub mod combat;
pub mod core;
pub mod entity;
pub mod grid;
pub mod lock;
pub mod scheduler;
pub mod sync;
