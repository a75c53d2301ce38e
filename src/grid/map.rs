//! Battle grid: a fixed set of hex cells with terrain, height and occupancy
//!
//! Topology is frozen when the grid is built. Only occupancy changes during a
//! battle, and only through `place`, `vacate` and `relocate`, which keep the
//! one-entity-per-cell rule.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{BattleError, Result};
use crate::core::types::EntityId;
use crate::grid::hex::HexCoord;
use crate::grid::terrain::Terrain;

/// A single cell on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub height: i8,
    occupant: Option<EntityId>,
}

impl HexCell {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            height: 0,
            occupant: None,
        }
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// The full battle grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexGrid {
    cells: AHashMap<HexCoord, HexCell>,
    pub width: u32,
    pub height: u32,
}

impl HexGrid {
    /// Rectangle of open cells, `width` columns of q by `height` rows of r
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = AHashMap::with_capacity((width * height) as usize);
        for q in 0..width as i32 {
            for r in 0..height as i32 {
                let coord = HexCoord::new(q, r);
                cells.insert(coord, HexCell::new(coord, Terrain::Open));
            }
        }

        Self {
            cells,
            width,
            height,
        }
    }

    pub fn get(&self, coord: HexCoord) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.terrain = terrain;
        }
    }

    pub fn set_height(&mut self, coord: HexCoord, height: i8) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.height = height;
        }
    }

    pub fn occupant(&self, coord: HexCoord) -> Option<EntityId> {
        self.get(coord).and_then(HexCell::occupant)
    }

    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.occupant(coord).is_some()
    }

    /// Put an entity into an empty cell
    pub fn place(&mut self, entity: EntityId, coord: HexCoord) -> Result<()> {
        let cell = self
            .cells
            .get_mut(&coord)
            .ok_or(BattleError::Unreachable(coord))?;
        if cell.occupant.is_some() {
            return Err(BattleError::CellOccupied(coord));
        }
        cell.occupant = Some(entity);
        Ok(())
    }

    /// Clear a cell, returning whoever stood there
    pub fn vacate(&mut self, coord: HexCoord) -> Option<EntityId> {
        self.cells.get_mut(&coord).and_then(|cell| cell.occupant.take())
    }

    /// Move the occupant of `from` into the empty cell `to`
    pub fn relocate(&mut self, from: HexCoord, to: HexCoord) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if !self.contains(to) {
            return Err(BattleError::Unreachable(to));
        }
        if self.is_occupied(to) {
            return Err(BattleError::CellOccupied(to));
        }
        let entity = self.vacate(from).ok_or(BattleError::NoTarget(from))?;
        self.place(entity, to)
    }

    /// Cost of stepping from one cell into an adjacent one
    ///
    /// Terrain cost of the destination plus one per height step climbed.
    /// Descending is free.
    pub fn step_cost(&self, from: HexCoord, to: HexCoord) -> Option<u32> {
        let from_cell = self.get(from)?;
        let to_cell = self.get(to)?;
        let base = to_cell.terrain.movement_cost()?;
        let climb = (to_cell.height as i32 - from_cell.height as i32).max(0) as u32;
        Some(base + climb)
    }

    /// Every occupied cell, ordered by coordinate
    pub fn occupancy(&self) -> BTreeMap<HexCoord, EntityId> {
        self.cells
            .values()
            .filter_map(|cell| cell.occupant.map(|id| (cell.coord, id)))
            .collect()
    }

    /// Where an entity currently stands
    pub fn position_of(&self, entity: EntityId) -> Option<HexCoord> {
        self.cells
            .values()
            .find(|cell| cell.occupant == Some(entity))
            .map(|cell| cell.coord)
    }
}
