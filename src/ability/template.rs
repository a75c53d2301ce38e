//! Ability templates
//!
//! Templates are immutable and shared by `Arc`. Entities never edit an ability;
//! they only swap which templates their keys point at.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{BattleError, Result};

/// Hotkey slot a fighting style binds abilities to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityKey {
    Q,
    W,
    E,
    R,
}

impl AbilityKey {
    pub const ALL: [AbilityKey; 4] = [AbilityKey::Q, AbilityKey::W, AbilityKey::E, AbilityKey::R];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AbilityKind {
    #[default]
    Active,
    Passive,
}

/// Resources spent when the ability is used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AbilityCost {
    pub pos: f32,
    pub mana: f32,
}

impl AbilityCost {
    pub fn new(pos: f32, mana: f32) -> Self {
        Self { pos, mana }
    }

    pub fn pos(pos: f32) -> Self {
        Self { pos, mana: 0.0 }
    }
}

/// One die in an ability's roll
///
/// Plain dice always land. Weighted dice roll `1..=damage` for magnitude and
/// only count when a d100 comes up at or under `accuracy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Die {
    Weighted { damage: u32, accuracy: u32 },
    Plain { sides: u32 },
}

impl Die {
    pub fn sides(&self) -> u32 {
        match self {
            Die::Plain { sides } => *sides,
            Die::Weighted { damage, .. } => *damage,
        }
    }

    pub fn accuracy(&self) -> Option<u32> {
        match self {
            Die::Plain { .. } => None,
            Die::Weighted { accuracy, .. } => Some(*accuracy),
        }
    }
}

/// Inclusive hex distance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRange {
    pub min: u32,
    pub max: u32,
}

impl AbilityRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn melee() -> Self {
        Self { min: 1, max: 1 }
    }

    pub fn contains(&self, distance: u32) -> bool {
        (self.min..=self.max).contains(&distance)
    }
}

/// Direction the user commits to while executing the ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stance {
    #[default]
    Forward,
    Backward,
    Stationary,
}

/// Damage scaling category, scaled by one of the user's stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Potency {
    Physical,
    Elemental,
    Arcane,
    Divine,
}

/// Channel the damage arrives through, checked against target resistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageType {
    Cut,
    Pierce,
    Blunt,
    Fire,
    Frost,
    Lightning,
    Holy,
}

/// Immutable ability definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub kind: AbilityKind,
    #[serde(default)]
    pub cost: AbilityCost,
    #[serde(default)]
    pub dice: Vec<Die>,
    pub range: AbilityRange,
    #[serde(default)]
    pub stance: Stance,
    #[serde(default)]
    pub potency: BTreeMap<Potency, f32>,
    #[serde(default)]
    pub damage_types: BTreeMap<DamageType, f32>,
}

impl Ability {
    /// Active ability with no dice, no weights and no cost
    pub fn new(name: impl Into<String>, range: AbilityRange) -> Self {
        Self {
            name: name.into(),
            kind: AbilityKind::Active,
            cost: AbilityCost::default(),
            dice: Vec::new(),
            range,
            stance: Stance::Forward,
            potency: BTreeMap::new(),
            damage_types: BTreeMap::new(),
        }
    }

    pub fn with_cost(mut self, cost: AbilityCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_die(mut self, die: Die) -> Self {
        self.dice.push(die);
        self
    }

    pub fn with_potency(mut self, potency: Potency, weight: f32) -> Self {
        self.potency.insert(potency, weight);
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageType, weight: f32) -> Self {
        self.damage_types.insert(damage_type, weight);
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    pub fn passive(mut self) -> Self {
        self.kind = AbilityKind::Passive;
        self
    }

    pub fn is_active(&self) -> bool {
        self.kind == AbilityKind::Active
    }

    /// Reject templates that could break resolution invariants
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(BattleError::Config(format!("ability {}: {}", self.name, msg)));

        if self.range.min > self.range.max {
            return fail(format!("range {}..={} is empty", self.range.min, self.range.max));
        }
        if self.cost.pos < 0.0 || self.cost.mana < 0.0 {
            return fail("negative cost".into());
        }
        for die in &self.dice {
            if die.sides() == 0 {
                return fail("die with zero sides".into());
            }
            if die.accuracy().is_some_and(|acc| acc > 100) {
                return fail("accuracy above 100".into());
            }
        }
        let mut weights = self.potency.values().chain(self.damage_types.values());
        if weights.any(|w| !w.is_finite() || *w < 0.0) {
            return fail("weights must be finite and non-negative".into());
        }
        Ok(())
    }
}
