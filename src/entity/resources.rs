//! Current values of an entity's resource pools
//!
//! Every mutation clamps to `[0, max]`. Costs are validate-then-commit: if
//! either pool is short, nothing changes.

use serde::{Deserialize, Serialize};

use crate::ability::AbilityCost;
use crate::core::error::{BattleError, ResourceKind, Result};
use crate::entity::stats::ResourceMaxima;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourcePools {
    pub hip: f32,
    pub sta: f32,
    pub org: f32,
    pub pos: f32,
    pub mana: f32,
}

impl ResourcePools {
    /// Full pools, except pos which starts empty
    pub fn fresh(max: &ResourceMaxima) -> Self {
        Self {
            hip: max.hip,
            sta: max.sta,
            org: max.org,
            pos: 0.0,
            mana: max.mana,
        }
    }

    /// Check a cost without paying it
    pub fn can_afford(&self, cost: &AbilityCost) -> Result<()> {
        if self.pos < cost.pos {
            return Err(BattleError::InsufficientResource {
                kind: ResourceKind::Pos,
                required: cost.pos,
                available: self.pos,
            });
        }
        if self.mana < cost.mana {
            return Err(BattleError::InsufficientResource {
                kind: ResourceKind::Mana,
                required: cost.mana,
                available: self.mana,
            });
        }
        Ok(())
    }

    /// Deduct pos and mana together, or neither
    pub fn apply_cost(&mut self, cost: &AbilityCost) -> Result<()> {
        self.can_afford(cost)?;
        self.pos -= cost.pos;
        self.mana -= cost.mana;
        Ok(())
    }

    /// Add readiness, returning the amount actually gained
    pub fn gain_pos(&mut self, amount: f32, max: &ResourceMaxima) -> f32 {
        let before = self.pos;
        self.pos = (self.pos + amount.max(0.0)).min(max.pos);
        self.pos - before
    }

    /// Remove hip, clamped at zero; returns (before, after)
    pub fn take_damage(&mut self, amount: u32) -> (f32, f32) {
        let before = self.hip;
        self.hip = (self.hip - amount as f32).max(0.0);
        (before, self.hip)
    }

    /// Pull every pool back inside its bounds
    pub fn clamp_to(&mut self, max: &ResourceMaxima) {
        self.hip = clamp_pool(self.hip, max.hip);
        self.sta = clamp_pool(self.sta, max.sta);
        self.org = clamp_pool(self.org, max.org);
        self.pos = clamp_pool(self.pos, max.pos);
        self.mana = clamp_pool(self.mana, max.mana);
    }

    /// True when every pool sits inside `[0, max]`
    pub fn within(&self, max: &ResourceMaxima) -> bool {
        [
            (self.hip, max.hip),
            (self.sta, max.sta),
            (self.org, max.org),
            (self.pos, max.pos),
            (self.mana, max.mana),
        ]
        .iter()
        .all(|(value, cap)| *value >= 0.0 && value <= cap)
    }
}

fn clamp_pool(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}
