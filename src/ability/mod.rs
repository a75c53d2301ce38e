//! Ability templates and the catalog that owns them

pub mod catalog;
pub mod template;

pub use catalog::AbilityCatalog;
pub use template::{
    Ability, AbilityCost, AbilityKey, AbilityKind, AbilityRange, DamageType, Die, Potency, Stance,
};
