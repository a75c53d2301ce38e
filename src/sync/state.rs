//! Publishes snapshot diffs to attached observers

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::sync::observer::Observer;
use crate::sync::snapshot::{BattleSnapshot, SnapshotDelta};

/// Last published state plus the observers it goes to
#[derive(Default)]
pub struct StateSync {
    observers: Vec<Arc<dyn Observer>>,
    published: BTreeMap<String, Value>,
    version: Option<u64>,
}

impl StateSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the last accepted snapshot
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.published.get(name)
    }

    /// Register an observer and hand it the full current state
    pub fn attach(&mut self, observer: Arc<dyn Observer>) {
        observer.hydrate(self.version.unwrap_or(0), &self.published);
        self.observers.push(observer);
    }

    /// Push what changed since the last accepted snapshot
    ///
    /// Snapshots not newer than the last accepted one are dropped, so a late
    /// publish can never roll observers back.
    pub fn publish(&mut self, snapshot: BattleSnapshot) -> Option<SnapshotDelta> {
        if self.version.is_some_and(|last| snapshot.version <= last) {
            tracing::debug!(
                version = snapshot.version,
                last = self.version,
                "stale snapshot ignored"
            );
            return None;
        }

        let delta = SnapshotDelta::between(&self.published, &snapshot.values, snapshot.version);
        for observer in &self.observers {
            for name in &delta.removed {
                observer.retract(name);
            }
            for (name, value) in &delta.changed {
                observer.publish(name, value);
            }
        }

        self.published = snapshot.values;
        self.version = Some(snapshot.version);
        Some(delta)
    }

    /// Full state push to every observer
    pub fn resync(&self) {
        let version = self.version.unwrap_or(0);
        for observer in &self.observers {
            observer.hydrate(version, &self.published);
        }
    }
}

impl std::fmt::Debug for StateSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSync")
            .field("observers", &self.observers.len())
            .field("version", &self.version)
            .field("values", &self.published.len())
            .finish()
    }
}
