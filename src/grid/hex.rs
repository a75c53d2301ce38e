//! Axial hex coordinates
//!
//! Every spatial query in the engine (range checks, movement, occupancy) is
//! expressed in (q, r).

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Hex metric: (|dq| + |dr| + |dq + dr|) / 2
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as u32
    }

    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.distance(other) == 1
    }

    /// The six neighbours, in `HexDirection::ALL` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.step(dir))
    }

    pub fn step(&self, direction: HexDirection) -> HexCoord {
        let offset = direction.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Hexes on the straight line from self to other, both ends included
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }

        (0..=n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let q = self.q as f32 + (other.q - self.q) as f32 * t;
                let r = self.r as f32 + (other.r - self.r) as f32 * t;
                Self::round(q, r)
            })
            .collect()
    }

    /// Round fractional axial coordinates to the containing hex
    fn round(q: f32, r: f32) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// Hexes whose distance from self lies in `min..=max`
    pub fn ring_range(&self, min: u32, max: u32) -> Vec<HexCoord> {
        let range = max as i32;
        let mut results = Vec::new();
        for dq in -range..=range {
            for dr in (-range).max(-dq - range)..=range.min(-dq + range) {
                let coord = HexCoord::new(self.q + dq, self.r + dr);
                if self.distance(&coord) >= min {
                    results.push(coord);
                }
            }
        }
        results
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Facing on a pointy-top hex grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same() {
        let a = HexCoord::new(3, -2);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_distance_all_neighbors_one() {
        let center = HexCoord::new(4, 4);
        for n in center.neighbors() {
            assert_eq!(center.distance(&n), 1);
            assert!(center.is_adjacent(&n));
        }
    }

    #[test]
    fn test_distance_diagonal() {
        // (0,0) -> (2,-1): dq=2, dr=-1, dq+dr=1 -> (2+1+1)/2 = 2
        assert_eq!(HexCoord::ORIGIN.distance(&HexCoord::new(2, -1)), 2);
        // (0,0) -> (3,3): (3+3+6)/2 = 6
        assert_eq!(HexCoord::ORIGIN.distance(&HexCoord::new(3, 3)), 6);
    }

    #[test]
    fn test_line_endpoints_and_length() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(4, -2);
        let line = a.line_to(&b);
        assert_eq!(line.len(), a.distance(&b) as usize + 1);
        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
    }

    #[test]
    fn test_ring_range_counts() {
        let center = HexCoord::ORIGIN;
        assert_eq!(center.ring_range(0, 1).len(), 7);
        assert_eq!(center.ring_range(1, 1).len(), 6);
        assert_eq!(center.ring_range(2, 2).len(), 12);
    }
}
