//! Terrain types and their movement effects

use serde::{Deserialize, Serialize};

/// Ground type of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Open,
    Rough,
    Forest,
    ShallowWater,
    DeepWater,
    Wall,
}

impl Terrain {
    /// Cost to enter a cell of this terrain, `None` if it cannot be entered
    pub fn movement_cost(&self) -> Option<u32> {
        match self {
            Terrain::Open => Some(1),
            Terrain::Rough => Some(2),
            Terrain::Forest => Some(2),
            Terrain::ShallowWater => Some(3),
            Terrain::DeepWater | Terrain::Wall => None,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_some()
    }
}
