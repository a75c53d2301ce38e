//! Fighting styles: swappable Q/W/E/R bindings plus passive resistances

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ability::{Ability, AbilityKey, DamageType};

#[derive(Debug, Clone, PartialEq)]
pub struct FightingStyle {
    pub name: String,
    /// Pos paid to switch into this style
    pub switch_cost: f32,
    pub abilities: BTreeMap<AbilityKey, Arc<Ability>>,
    /// Multipliers applied on top of the entity's base resistances
    pub resistances: BTreeMap<DamageType, f32>,
}

impl FightingStyle {
    pub fn new(name: impl Into<String>, switch_cost: f32) -> Self {
        Self {
            name: name.into(),
            switch_cost,
            abilities: BTreeMap::new(),
            resistances: BTreeMap::new(),
        }
    }

    pub fn bind(mut self, key: AbilityKey, ability: Arc<Ability>) -> Self {
        self.abilities.insert(key, ability);
        self
    }

    pub fn with_resistance(mut self, damage_type: DamageType, multiplier: f32) -> Self {
        self.resistances.insert(damage_type, multiplier);
        self
    }

    /// Passive multiplier for a damage type (1.0 when the style is silent)
    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        self.resistances.get(&damage_type).copied().unwrap_or(1.0)
    }
}
