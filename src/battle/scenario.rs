//! Battle setups loaded from TOML
//!
//! ```toml
//! [[terrain]]
//! q = 3
//! r = 1
//! terrain = "wall"
//!
//! [[entity]]
//! name = "Vanguard"
//! team = 0
//! q = 2
//! r = 2
//! stats = { speed = 30, strength = 14 }
//!
//! [[entity.style]]
//! name = "Blade"
//! abilities = { Q = "Strike", W = "Lunge" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ability::{AbilityCatalog, AbilityKey, DamageType};
use crate::battle::state::Battle;
use crate::core::config::EngineConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{EntityId, TeamId};
use crate::entity::{Entity, FightingStyle, StatBlock};
use crate::grid::{HexCoord, HexGrid, Terrain};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    pub name: String,
    #[serde(default)]
    pub switch_cost: f32,
    /// Key to catalog ability name
    #[serde(default)]
    pub abilities: BTreeMap<AbilityKey, String>,
    #[serde(default)]
    pub resistances: BTreeMap<DamageType, f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub team: u8,
    pub q: i32,
    pub r: i32,
    #[serde(default)]
    pub stats: StatBlock,
    #[serde(default)]
    pub resistances: BTreeMap<DamageType, f32>,
    #[serde(default, rename = "style")]
    pub styles: Vec<StyleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub q: i32,
    pub r: i32,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub height: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "terrain")]
    pub terrain: Vec<TerrainSpec>,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntitySpec>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Two-sided skirmish with the built-in abilities
    pub fn duel() -> Self {
        let blade = StyleSpec {
            name: "Blade".into(),
            switch_cost: 10.0,
            abilities: BTreeMap::from([
                (AbilityKey::Q, "Strike".into()),
                (AbilityKey::W, "Heavy Blow".into()),
                (AbilityKey::E, "Lunge".into()),
                (AbilityKey::R, "Disengage".into()),
            ]),
            resistances: BTreeMap::new(),
        };
        let bulwark = StyleSpec {
            name: "Bulwark".into(),
            switch_cost: 15.0,
            abilities: BTreeMap::from([
                (AbilityKey::Q, "Strike".into()),
                (AbilityKey::R, "Iron Skin".into()),
            ]),
            resistances: BTreeMap::from([
                (DamageType::Cut, 0.7),
                (DamageType::Pierce, 0.7),
                (DamageType::Blunt, 0.8),
            ]),
        };
        let arcana = StyleSpec {
            name: "Arcana".into(),
            switch_cost: 10.0,
            abilities: BTreeMap::from([
                (AbilityKey::Q, "Firebolt".into()),
                (AbilityKey::W, "Frost Lance".into()),
                (AbilityKey::E, "Smite".into()),
                (AbilityKey::R, "Disengage".into()),
            ]),
            resistances: BTreeMap::new(),
        };

        let fighter_stats = StatBlock {
            strength: 16,
            endurance: 14,
            speed: 30,
            ..StatBlock::default()
        };
        let mage_stats = StatBlock {
            intelligence: 18,
            spirituality: 14,
            faith: 12,
            speed: 25,
            ..StatBlock::default()
        };

        Self {
            terrain: vec![
                TerrainSpec {
                    q: 4,
                    r: 3,
                    terrain: Terrain::Forest,
                    height: 1,
                },
                TerrainSpec {
                    q: 5,
                    r: 4,
                    terrain: Terrain::Rough,
                    height: 0,
                },
            ],
            entities: vec![
                EntitySpec {
                    name: "Vanguard".into(),
                    team: 0,
                    q: 2,
                    r: 4,
                    stats: fighter_stats,
                    resistances: BTreeMap::new(),
                    styles: vec![blade, bulwark],
                },
                EntitySpec {
                    name: "Pyromancer".into(),
                    team: 1,
                    q: 8,
                    r: 4,
                    stats: mage_stats,
                    resistances: BTreeMap::from([(DamageType::Fire, 0.5)]),
                    styles: vec![arcana],
                },
            ],
        }
    }

    /// Lay out the grid and entities; ids are numbered in declaration order
    pub fn build(&self, config: EngineConfig, catalog: &AbilityCatalog) -> Result<Battle> {
        config.validate()?;
        let mut grid = HexGrid::new(config.battle.width, config.battle.height);
        for cell in &self.terrain {
            let coord = HexCoord::new(cell.q, cell.r);
            if !grid.contains(coord) {
                return Err(BattleError::Config(format!("terrain at {coord} is off the grid")));
            }
            grid.set_terrain(coord, cell.terrain);
            grid.set_height(coord, cell.height);
        }

        let mut battle = Battle::with_grid(config, grid);
        for (index, spec) in self.entities.iter().enumerate() {
            let entity = spec.to_entity(EntityId::from_u128(index as u128 + 1), catalog)?;
            battle.add_entity(entity)?;
        }
        Ok(battle)
    }
}

impl EntitySpec {
    fn to_entity(&self, id: EntityId, catalog: &AbilityCatalog) -> Result<Entity> {
        let mut entity = Entity::with_id(id, self.name.clone(), TeamId::new(self.team), self.stats)
            .at(HexCoord::new(self.q, self.r));
        for (damage_type, multiplier) in &self.resistances {
            entity = entity.with_resistance(*damage_type, *multiplier);
        }
        for spec in &self.styles {
            let mut style = FightingStyle::new(spec.name.clone(), spec.switch_cost);
            for (key, name) in &spec.abilities {
                style = style.bind(*key, catalog.get(name)?);
            }
            for (damage_type, multiplier) in &spec.resistances {
                style = style.with_resistance(*damage_type, *multiplier);
            }
            entity = entity.with_style(style);
        }
        Ok(entity)
    }
}
