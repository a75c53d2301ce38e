//! Observer side of the sync boundary

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Receives authoritative values by name
pub trait Observer: Send + Sync {
    fn publish(&self, name: &str, value: &Value);

    fn retract(&self, _name: &str) {}

    /// Full state push for a newly attached observer or a resync
    fn hydrate(&self, _version: u64, values: &BTreeMap<String, Value>) {
        for (name, value) in values {
            self.publish(name, value);
        }
    }
}

#[derive(Debug, Default)]
struct MirrorState {
    values: BTreeMap<String, Value>,
    version: u64,
    publishes: usize,
    hydrations: usize,
}

/// Observer that keeps a local copy of everything it was sent
#[derive(Debug, Default)]
pub struct MirrorObserver {
    state: Mutex<MirrorState>,
}

impl MirrorObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.state().values.get(name).cloned()
    }

    pub fn values(&self) -> BTreeMap<String, Value> {
        self.state().values.clone()
    }

    /// Version of the last hydration
    pub fn hydrated_version(&self) -> u64 {
        self.state().version
    }

    /// Number of incremental publishes received
    pub fn publish_count(&self) -> usize {
        self.state().publishes
    }

    pub fn hydrate_count(&self) -> usize {
        self.state().hydrations
    }
}

impl Observer for MirrorObserver {
    fn publish(&self, name: &str, value: &Value) {
        let mut state = self.state();
        state.values.insert(name.to_owned(), value.clone());
        state.publishes += 1;
    }

    fn retract(&self, name: &str) {
        self.state().values.remove(name);
    }

    fn hydrate(&self, version: u64, values: &BTreeMap<String, Value>) {
        let mut state = self.state();
        state.values = values.clone();
        state.version = version;
        state.hydrations += 1;
    }
}
