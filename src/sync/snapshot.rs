//! Versioned snapshots of authoritative battle values

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::types::EntityId;

pub const READINESS: &str = "readiness";
pub const GRID_OCCUPANCY: &str = "grid/occupancy";
pub const LAST_CLASH: &str = "clash/last";
pub const TURN: &str = "turn";

const ENTITY_PREFIX: &str = "entity/";

/// Value name for one entity's resource snapshot
pub fn entity_key(id: EntityId) -> String {
    format!("{ENTITY_PREFIX}{id}")
}

pub fn is_entity_key(name: &str) -> bool {
    name.starts_with(ENTITY_PREFIX)
}

/// Named values captured at one battle version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub version: u64,
    pub values: BTreeMap<String, Value>,
}

impl BattleSnapshot {
    pub fn new(version: u64) -> Self {
        Self {
            version,
            values: BTreeMap::new(),
        }
    }

    /// Add a value; anything serde can't encode is stored as null
    pub fn insert<T: Serialize>(&mut self, name: impl Into<String>, value: &T) {
        let name = name.into();
        let value = serde_json::to_value(value).unwrap_or_else(|err| {
            tracing::warn!(%name, %err, "value not serializable");
            Value::Null
        });
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// What changed between two published snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    pub version: u64,
    pub changed: Vec<(String, Value)>,
    pub removed: Vec<String>,
}

impl SnapshotDelta {
    pub fn between(
        previous: &BTreeMap<String, Value>,
        current: &BTreeMap<String, Value>,
        version: u64,
    ) -> Self {
        Self {
            version,
            changed: diff_changed(previous, current),
            removed: diff_removed(previous, current),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

fn diff_changed(previous: &BTreeMap<String, Value>, current: &BTreeMap<String, Value>) -> Vec<(String, Value)> {
    current
        .iter()
        .filter_map(|(name, value)| match previous.get(name) {
            Some(prev) if prev == value => None,
            _ => Some((name.clone(), value.clone())),
        })
        .collect()
}

fn diff_removed(previous: &BTreeMap<String, Value>, current: &BTreeMap<String, Value>) -> Vec<String> {
    previous
        .keys()
        .filter(|name| !current.contains_key(*name))
        .cloned()
        .collect()
}
