//! Uniform cost search over the hex grid
//!
//! The open set is a binary heap keyed by accumulated cost; equal costs pop
//! in insertion order so the same grid always yields the same path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::core::error::{BattleError, Result};
use crate::grid::hex::HexCoord;
use crate::grid::map::HexGrid;

/// Node in the open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    coord: HexCoord,
    cost: u32,
    seq: u64,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: lower cost first, then earlier insertion
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest path from `start` to `goal`
///
/// `cost_fn(from, to)` prices a single step between adjacent cells; `None`
/// means the step is forbidden. The returned path includes both endpoints.
/// An occupied goal is rejected with `CellOccupied` before searching.
pub fn find_path<F>(
    grid: &HexGrid,
    start: HexCoord,
    goal: HexCoord,
    cost_fn: F,
) -> Result<Vec<HexCoord>>
where
    F: Fn(HexCoord, HexCoord) -> Option<u32>,
{
    if !grid.contains(goal) || !grid.contains(start) {
        return Err(BattleError::Unreachable(goal));
    }
    if start == goal {
        return Ok(vec![start]);
    }
    if grid.is_occupied(goal) {
        return Err(BattleError::CellOccupied(goal));
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut best: HashMap<HexCoord, u32> = HashMap::new();
    let mut seq = 0u64;

    best.insert(start, 0);
    open_set.push(PathNode {
        coord: start,
        cost: 0,
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Ok(reconstruct_path(&came_from, goal));
        }

        // Stale entry superseded by a cheaper push
        if best.get(&current.coord).is_some_and(|&c| c < current.cost) {
            continue;
        }

        for neighbor in current.coord.neighbors() {
            if !grid.contains(neighbor) {
                continue;
            }
            let Some(step) = cost_fn(current.coord, neighbor) else {
                continue;
            };

            let tentative = current.cost + step;
            let known = best.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative < known {
                came_from.insert(neighbor, current.coord);
                best.insert(neighbor, tentative);
                seq += 1;
                open_set.push(PathNode {
                    coord: neighbor,
                    cost: tentative,
                    seq,
                });
            }
        }
    }

    Err(BattleError::Unreachable(goal))
}

fn reconstruct_path(came_from: &HashMap<HexCoord, HexCoord>, mut current: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Total step cost of a path under the grid's own pricing
pub fn path_cost(grid: &HexGrid, path: &[HexCoord]) -> Option<u32> {
    path.windows(2)
        .map(|pair| grid.step_cost(pair[0], pair[1]))
        .sum()
}

/// Grid pricing that also refuses to walk through occupied cells
pub fn walkable_cost(grid: &HexGrid) -> impl Fn(HexCoord, HexCoord) -> Option<u32> + '_ {
    move |from, to| {
        if grid.is_occupied(to) {
            return None;
        }
        grid.step_cost(from, to)
    }
}
