//! Combat constants - all tunable values in one place

use crate::ability::Potency;
use crate::entity::StatBlock;

/// Sides of the accuracy die
pub const ACCURACY_DIE: u32 = 100;

/// Stat points that add one whole multiplier to a potency
pub const POTENCY_STAT_DIVISOR: f32 = 100.0;

/// Stat that scales a potency
pub fn potency_stat(potency: Potency, stats: &StatBlock) -> u32 {
    match potency {
        Potency::Physical => stats.strength,
        Potency::Elemental => stats.intelligence,
        Potency::Arcane => stats.spirituality,
        Potency::Divine => stats.faith,
    }
}

/// Multiplier a user brings to a potency: `1 + stat / 100`
pub fn potency_multiplier(potency: Potency, stats: &StatBlock) -> f32 {
    1.0 + potency_stat(potency, stats) as f32 / POTENCY_STAT_DIVISOR
}
