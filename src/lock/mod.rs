//! Action lock guard: per-category UI action serialization

pub mod clock;
pub mod guard;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{ActionLockGuard, LockCategory, LockState};
