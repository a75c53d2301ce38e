//! Entities in a battle, kept in the order they joined
//!
//! Join order is the stable secondary key everywhere iteration order could
//! leak into results (readiness ticks, snapshots).

use ahash::AHashMap;

use crate::core::error::{BattleError, Result};
use crate::core::types::{EntityId, TeamId};
use crate::entity::combatant::Entity;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    order: Vec<EntityId>,
    entities: AHashMap<EntityId, Entity>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity; a duplicate id replaces nothing and is reported
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        if self.entities.contains_key(&entity.id) {
            return Err(BattleError::Config(format!("duplicate entity id {}", entity.id)));
        }
        self.order.push(entity.id);
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.order.retain(|other| *other != id);
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(BattleError::ActorNotFound(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(BattleError::ActorNotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in join order
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Entities in join order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn living(&self) -> impl Iterator<Item = &Entity> {
        self.iter().filter(|entity| !entity.is_dead())
    }

    /// Teams with at least one living member, sorted
    pub fn living_teams(&self) -> Vec<TeamId> {
        let mut teams: Vec<TeamId> = self.living().map(|entity| entity.team).collect();
        teams.sort();
        teams.dedup();
        teams
    }
}
