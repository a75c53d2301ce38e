//! Turn scheduling by readiness accumulation

pub mod readiness;

pub use readiness::{ActingTurn, ReadinessFragment, ReadinessScheduler, SchedulerEvent, TurnState};
