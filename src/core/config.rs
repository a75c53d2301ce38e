//! Engine configuration with documented constants
//!
//! Every tunable lives here. Loaded from TOML; missing sections fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{BattleError, Result};
use crate::lock::LockCategory;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub locks: LockConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub battle: BattleConfig,
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.scheduler.readiness_k > 0.0) {
            return Err(BattleError::Config(format!(
                "readiness_k must be positive, got {}",
                self.scheduler.readiness_k
            )));
        }

        if !(self.scheduler.ready_threshold > 0.0 && self.scheduler.ready_threshold <= 100.0) {
            return Err(BattleError::Config(format!(
                "ready_threshold must be in (0, 100], got {}",
                self.scheduler.ready_threshold
            )));
        }

        if self.battle.width == 0 || self.battle.height == 0 {
            return Err(BattleError::Config("battle grid must not be empty".into()));
        }

        Ok(())
    }
}

/// Readiness scheduler tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Readiness gained per point of speed per second
    ///
    /// At 1.0, a speed 30 entity needs four one-second ticks to reach 100.
    pub readiness_k: f32,

    /// Pos at which an entity becomes ready to act
    pub ready_threshold: f32,

    /// Tick length used by the headless runner (seconds)
    pub tick_seconds: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            readiness_k: 1.0,
            ready_threshold: 100.0,
            tick_seconds: 1.0,
        }
    }
}

/// Action lock TTLs, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub ability_selection_ms: u64,
    pub movement_ms: u64,
    pub attack_ms: u64,
    pub style_switch_ms: u64,
    pub global_ms: u64,

    /// Window inside which repeated ability selections are dropped
    pub selection_debounce_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ability_selection_ms: 300,
            movement_ms: 1_000,
            attack_ms: 1_500,
            style_switch_ms: 800,
            global_ms: 5_000,
            selection_debounce_ms: 150,
        }
    }
}

impl LockConfig {
    /// Default TTL for a lock category
    pub fn ttl(&self, category: LockCategory) -> Duration {
        let ms = match category {
            LockCategory::AbilitySelection => self.ability_selection_ms,
            LockCategory::Movement => self.movement_ms,
            LockCategory::Attack => self.attack_ms,
            LockCategory::StyleSwitch => self.style_switch_ms,
            LockCategory::Global => self.global_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }
}

/// Movement pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Pos spent per unit of path cost
    pub move_pos_per_step: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_pos_per_step: 5.0,
        }
    }
}

/// Battle setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for every dice roll in the battle
    pub seed: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 12,
            height: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_str(
            r#"
            [scheduler]
            readiness_k = 2.5

            [battle]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.scheduler.readiness_k, 2.5);
        assert_eq!(config.scheduler.ready_threshold, 100.0);
        assert_eq!(config.battle.seed, 7);
        assert_eq!(config.battle.width, 12);
        assert_eq!(config.locks, LockConfig::default());
    }

    #[test]
    fn test_invalid_k_rejected() {
        let result = EngineConfig::from_str("[scheduler]\nreadiness_k = 0.0\n");
        assert!(matches!(result, Err(BattleError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = EngineConfig::from_str("[scheduler\nreadiness_k = 1");
        assert!(matches!(result, Err(BattleError::TomlError(_))));
    }

    #[test]
    fn test_lock_ttls() {
        let locks = LockConfig::default();
        assert_eq!(locks.ttl(LockCategory::Attack), Duration::from_millis(1_500));
        assert_eq!(locks.ttl(LockCategory::Global), Duration::from_millis(5_000));
    }
}
