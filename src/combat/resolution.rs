//! Clash resolution
//!
//! Preview and execute go through the same `resolve` computation. The only
//! difference is what the caller does with the result: execution pays the
//! cost and applies the damage, preview throws the RNG clone away.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityCost, Stance};
use crate::combat::constants::potency_multiplier;
use crate::combat::dice::{roll_dice, DieRoll};
use crate::core::error::{BattleError, Result};
use crate::core::types::EntityId;
use crate::entity::Entity;
use crate::grid::HexCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveMode {
    Preview,
    Execute,
}

/// Everything that came out of one attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClashResult {
    pub attacker: EntityId,
    pub target: EntityId,
    pub ability: String,
    pub cell: HexCoord,
    pub stance: Stance,
    pub cost: AbilityCost,
    pub rolls: Vec<DieRoll>,
    pub hit: bool,
    pub raw_magnitude: u32,
    pub potency_factor: f32,
    pub resistance_factor: f32,
    pub damage: u32,
    pub target_hip_before: f32,
    pub target_hip_after: f32,
    pub target_died: bool,
    pub executed: bool,
}

/// Σ(potency weight × user's potency multiplier); neutral when unweighted
pub fn potency_factor(ability: &Ability, initiator: &Entity) -> f32 {
    if ability.potency.is_empty() {
        return 1.0;
    }
    ability
        .potency
        .iter()
        .map(|(potency, weight)| weight * potency_multiplier(*potency, initiator.stats()))
        .sum()
}

/// Σ(damage type weight × target resistance); neutral when unweighted
pub fn resistance_factor(ability: &Ability, target: &Entity) -> f32 {
    if ability.damage_types.is_empty() {
        return 1.0;
    }
    ability
        .damage_types
        .iter()
        .map(|(damage_type, weight)| weight * target.resistance(*damage_type))
        .sum()
}

/// Final damage: floor(raw × potency × resistance), never negative
pub fn final_damage(raw: u32, potency: f32, resistance: f32) -> u32 {
    let damage = (raw as f32 * potency * resistance).floor();
    if damage.is_finite() && damage > 0.0 {
        damage as u32
    } else {
        0
    }
}

/// Checks shared by every mode; nothing is mutated
pub fn validate(initiator: &Entity, ability: &Ability, target: &Entity, cell: HexCoord) -> Result<()> {
    if initiator.is_dead() {
        return Err(BattleError::EntityDead(initiator.id));
    }
    if target.is_dead() {
        return Err(BattleError::EntityDead(target.id));
    }
    if !ability.is_active() {
        return Err(BattleError::PassiveAbility(ability.name.clone()));
    }

    let distance = initiator.position.distance(&cell);
    if !ability.range.contains(distance) {
        return Err(BattleError::OutOfRange {
            distance,
            min: ability.range.min,
            max: ability.range.max,
        });
    }

    initiator.pools.can_afford(&ability.cost)
}

/// Validate, roll and price an attack without touching either entity
///
/// `mode` is recorded on the result; applying it is `commit`'s job.
pub fn resolve<R: Rng>(
    initiator: &Entity,
    ability: &Ability,
    target: &Entity,
    cell: HexCoord,
    mode: ResolveMode,
    rng: &mut R,
) -> Result<ClashResult> {
    validate(initiator, ability, target, cell)?;

    let (rolls, raw) = roll_dice(&ability.dice, rng);
    let hit = rolls.is_empty() || rolls.iter().any(|roll| roll.hit);
    let potency = potency_factor(ability, initiator);
    let resistance = resistance_factor(ability, target);
    let damage = final_damage(raw, potency, resistance);

    let before = target.pools.hip;
    let after = (before - damage as f32).max(0.0);

    tracing::debug!(
        attacker = %initiator.id,
        target = %target.id,
        ability = %ability.name,
        raw,
        damage,
        hit,
        ?mode,
        "clash resolved"
    );

    Ok(ClashResult {
        attacker: initiator.id,
        target: target.id,
        ability: ability.name.clone(),
        cell,
        stance: ability.stance,
        cost: ability.cost,
        rolls,
        hit,
        raw_magnitude: raw,
        potency_factor: potency,
        resistance_factor: resistance,
        damage,
        target_hip_before: before,
        target_hip_after: after,
        target_died: after <= 0.0,
        executed: mode == ResolveMode::Execute,
    })
}

/// Pay the attacker's cost for an executed clash
pub fn commit_cost(initiator: &mut Entity, clash: &ClashResult) -> Result<()> {
    debug_assert_eq!(initiator.id, clash.attacker);
    initiator.apply_cost(&clash.cost)
}

/// Apply an executed clash's damage to its target
pub fn commit_damage(target: &mut Entity, clash: &ClashResult) {
    debug_assert_eq!(target.id, clash.target);
    let (_, after) = target.pools.take_damage(clash.damage);
    debug_assert_eq!(after, clash.target_hip_after);
    target.check_invariants();
}
