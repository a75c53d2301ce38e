//! Base attributes and the resource maxima derived from them
//!
//! Maxima are never stored on the entity; they are recomputed from the stat
//! block whenever someone asks.

use serde::{Deserialize, Serialize};

/// Pos is a fixed 0..=100 budget regardless of stats
pub const POS_MAX: f32 = 100.0;

/// Twelve base attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub strength: u32,
    pub dexterity: u32,
    pub acrobatics: u32,
    pub speed: u32,
    pub size: u32,
    pub intelligence: u32,
    pub spirituality: u32,
    pub faith: u32,
    pub charisma: u32,
    pub beauty: u32,
    pub willpower: u32,
    pub endurance: u32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl StatBlock {
    /// Every attribute set to the same value
    pub fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            dexterity: value,
            acrobatics: value,
            speed: value,
            size: value,
            intelligence: value,
            spirituality: value,
            faith: value,
            charisma: value,
            beauty: value,
            willpower: value,
            endurance: value,
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    // Summed in f32: stats come straight from scenario files and may be huge
    pub fn max_hip(&self) -> f32 {
        50.0 + 5.0 * self.endurance as f32 + 3.0 * self.size as f32
    }

    pub fn max_sta(&self) -> f32 {
        40.0 + 4.0 * self.endurance as f32 + 2.0 * self.acrobatics as f32 + self.strength as f32
    }

    pub fn max_org(&self) -> f32 {
        20.0 + 3.0 * self.willpower as f32 + 2.0 * self.charisma as f32
    }

    pub fn max_mana(&self) -> f32 {
        3.0 * self.intelligence as f32 + 3.0 * self.spirituality as f32 + 2.0 * self.faith as f32
    }

    pub fn maxima(&self) -> ResourceMaxima {
        ResourceMaxima {
            hip: self.max_hip(),
            sta: self.max_sta(),
            org: self.max_org(),
            pos: POS_MAX,
            mana: self.max_mana(),
        }
    }
}

/// Upper bounds of every pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceMaxima {
    pub hip: f32,
    pub sta: f32,
    pub org: f32,
    pub pos: f32,
    pub mana: f32,
}
