//! Ability and combat resolver: dice, damage pricing and clash results

pub mod constants;
pub mod dice;
pub mod resolution;

pub use dice::{roll_dice, roll_die, DieRoll};
pub use resolution::{
    commit_cost, commit_damage, final_damage, potency_factor, resistance_factor, resolve,
    validate, ClashResult, ResolveMode,
};
