//! Hex spatial model: axial coordinates, the battle grid and pathfinding

pub mod hex;
pub mod map;
pub mod pathfinding;
pub mod terrain;

pub use hex::{HexCoord, HexDirection};
pub use map::{HexCell, HexGrid};
pub use pathfinding::{find_path, path_cost, walkable_cost};
pub use terrain::Terrain;
