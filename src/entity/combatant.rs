//! A single combatant: stats, pools, styles and its current ability set

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ability::{Ability, AbilityCost, AbilityKey, DamageType};
use crate::core::error::{BattleError, ResourceKind, Result};
use crate::core::types::{EntityId, TeamId};
use crate::entity::resources::ResourcePools;
use crate::entity::stats::{ResourceMaxima, StatBlock};
use crate::entity::style::FightingStyle;
use crate::grid::HexCoord;

/// Pool values published to observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub hip: f32,
    pub max_hip: f32,
    pub sta: f32,
    pub org: f32,
    pub pos: f32,
    pub mana: f32,
    pub max_mana: f32,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub team: TeamId,
    pub position: HexCoord,
    stats: StatBlock,
    pub pools: ResourcePools,
    styles: Vec<FightingStyle>,
    active_style: usize,
    abilities: BTreeMap<AbilityKey, Arc<Ability>>,
    armed: Option<AbilityKey>,
    /// Base resistance multipliers; absent types count as 1.0
    pub resistances: BTreeMap<DamageType, f32>,
}

impl Entity {
    pub fn new(name: impl Into<String>, team: TeamId, stats: StatBlock) -> Self {
        Self::with_id(EntityId::new(), name, team, stats)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>, team: TeamId, stats: StatBlock) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            position: HexCoord::ORIGIN,
            pools: ResourcePools::fresh(&stats.maxima()),
            stats,
            styles: Vec::new(),
            active_style: 0,
            abilities: BTreeMap::new(),
            armed: None,
            resistances: BTreeMap::new(),
        }
    }

    /// Append a fighting style; the first one becomes active
    pub fn with_style(mut self, style: FightingStyle) -> Self {
        if self.styles.is_empty() {
            self.abilities = style.abilities.clone();
            self.active_style = 0;
        }
        self.styles.push(style);
        self
    }

    pub fn at(mut self, position: HexCoord) -> Self {
        self.position = position;
        self
    }

    pub fn with_resistance(mut self, damage_type: DamageType, multiplier: f32) -> Self {
        self.resistances.insert(damage_type, multiplier);
        self
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Replace the stat block; pools are clamped to the new maxima
    pub fn set_stats(&mut self, stats: StatBlock) {
        self.stats = stats;
        let max = self.maxima();
        self.pools.clamp_to(&max);
    }

    pub fn maxima(&self) -> ResourceMaxima {
        self.stats.maxima()
    }

    pub fn speed(&self) -> u32 {
        self.stats.speed
    }

    pub fn is_dead(&self) -> bool {
        self.pools.hip <= 0.0
    }

    pub fn styles(&self) -> &[FightingStyle] {
        &self.styles
    }

    pub fn active_style_index(&self) -> usize {
        self.active_style
    }

    pub fn active_style(&self) -> Option<&FightingStyle> {
        self.styles.get(self.active_style)
    }

    pub fn abilities(&self) -> &BTreeMap<AbilityKey, Arc<Ability>> {
        &self.abilities
    }

    pub fn ability(&self, key: AbilityKey) -> Result<Arc<Ability>> {
        self.abilities
            .get(&key)
            .cloned()
            .ok_or(BattleError::UnknownAbilityKey(key))
    }

    pub fn armed(&self) -> Option<AbilityKey> {
        self.armed
    }

    /// Arm an active ability for the next attack
    pub fn select_ability(&mut self, key: AbilityKey) -> Result<()> {
        let ability = self.ability(key)?;
        if !ability.is_active() {
            return Err(BattleError::PassiveAbility(ability.name.clone()));
        }
        self.armed = Some(key);
        Ok(())
    }

    /// Effective multiplier against a damage type: base times style passive
    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        let base = self.resistances.get(&damage_type).copied().unwrap_or(1.0);
        let passive = self
            .active_style()
            .map(|style| style.resistance(damage_type))
            .unwrap_or(1.0);
        base * passive
    }

    pub fn apply_cost(&mut self, cost: &AbilityCost) -> Result<()> {
        self.pools.apply_cost(cost)?;
        self.check_invariants();
        Ok(())
    }

    /// Why a switch to `index` would fail, if it would
    fn check_style_switch(&self, index: usize) -> Result<f32> {
        let style = self
            .styles
            .get(index)
            .ok_or(BattleError::InvalidStyleIndex {
                index,
                count: self.styles.len(),
            })?;
        if index == self.active_style {
            return Err(BattleError::StyleAlreadyActive(index));
        }
        if self.pools.pos < style.switch_cost {
            return Err(BattleError::InsufficientResource {
                kind: ResourceKind::Pos,
                required: style.switch_cost,
                available: self.pools.pos,
            });
        }
        Ok(style.switch_cost)
    }

    pub fn can_switch_style(&self, index: usize) -> bool {
        self.check_style_switch(index).is_ok()
    }

    /// Pay the switch cost and swap in the style's ability set
    ///
    /// Returns the pos spent. The armed key is kept only if the new style
    /// binds it to an active ability.
    pub fn switch_fighting_style(&mut self, index: usize) -> Result<f32> {
        let cost = self.check_style_switch(index)?;
        self.pools.pos -= cost;
        self.active_style = index;
        self.abilities = self.styles[index].abilities.clone();
        if let Some(key) = self.armed {
            if !self.abilities.get(&key).is_some_and(|a| a.is_active()) {
                self.armed = None;
            }
        }
        self.check_invariants();
        Ok(cost)
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        let max = self.maxima();
        ResourceSnapshot {
            hip: self.pools.hip,
            max_hip: max.hip,
            sta: self.pools.sta,
            org: self.pools.org,
            pos: self.pools.pos,
            mana: self.pools.mana,
            max_mana: max.mana,
        }
    }

    /// Loud in debug builds, clamped in release builds
    pub(crate) fn check_invariants(&mut self) {
        let max = self.maxima();
        debug_assert!(
            self.pools.within(&max),
            "entity {} pools out of bounds: {:?}",
            self.id,
            self.pools
        );
        self.pools.clamp_to(&max);
    }
}
