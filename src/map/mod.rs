//! Text maps and the static grid knowledge derived from them.

pub mod layout;
pub mod parser;

use glam::IVec2;

pub use layout::{Layout, SpawnArea};
pub use parser::{GhostSpawn, MapParser, ParsedMap, Tile};

/// Manhattan distance between two cells.
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}
