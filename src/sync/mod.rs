//! State sync layer: versioned snapshots diffed out to observers

pub mod observer;
pub mod snapshot;
pub mod state;

pub use observer::{MirrorObserver, Observer};
pub use snapshot::{BattleSnapshot, SnapshotDelta};
pub use state::StateSync;
