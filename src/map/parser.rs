//! Map parsing functionality for converting text maps into structured data.
//!
//! The format is a `W H` header line followed by up to `H` rows of at most `W`
//! characters each. Only the header is validated: characters outside the tile
//! alphabet, characters past column `W` and rows past `H` are skipped.

use glam::IVec2;
use tracing::{trace, warn};

use crate::entity::ghost::{GhostColor, Personality};
use crate::error::ParseError;

/// A meaningful map character. Blanks and unknown characters have no tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tile {
    Wall,
    Coin,
    Fruit,
    PlayerSpawn,
    GhostSpawn(GhostColor),
    Exit,
}

impl Tile {
    /// Parses a single map character.
    pub fn from_char(c: char) -> Option<Tile> {
        match c {
            'x' => Some(Tile::Wall),
            '.' => Some(Tile::Coin),
            'f' => Some(Tile::Fruit),
            'P' => Some(Tile::PlayerSpawn),
            'r' => Some(Tile::GhostSpawn(GhostColor::Red)),
            'b' => Some(Tile::GhostSpawn(GhostColor::Cyan)),
            'o' => Some(Tile::GhostSpawn(GhostColor::Orange)),
            'p' => Some(Tile::GhostSpawn(GhostColor::Pink)),
            'w' => Some(Tile::Exit),
            _ => None,
        }
    }
}

/// Where a ghost starts and how it behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostSpawn {
    pub cell: IVec2,
    pub color: GhostColor,
    pub personality: Personality,
    /// Seconds spent waiting in the house before heading for the exit.
    pub wait_time: f32,
}

impl GhostSpawn {
    pub fn new(cell: IVec2, color: GhostColor) -> Self {
        let (personality, wait_time) = match color {
            GhostColor::Red => (Personality::Chaser, 0.0),
            GhostColor::Cyan => (Personality::Ambusher, 0.6),
            GhostColor::Orange => (Personality::Chaser, 5.0),
            GhostColor::Pink => (Personality::Random, 10.0),
        };
        Self {
            cell,
            color,
            personality,
            wait_time,
        }
    }
}

/// The parsed contents of a map file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMap {
    pub width: i32,
    pub height: i32,
    /// Every non-blank tile in reading order (row by row, left to right).
    pub tiles: Vec<(IVec2, Tile)>,
}

impl ParsedMap {
    /// The first `P` in reading order.
    pub fn player_spawn(&self) -> Option<IVec2> {
        self.tiles.iter().find(|(_, tile)| *tile == Tile::PlayerSpawn).map(|(cell, _)| *cell)
    }

    pub fn exits(&self) -> Vec<IVec2> {
        self.cells_of(Tile::Exit)
    }

    pub fn walls(&self) -> Vec<IVec2> {
        self.cells_of(Tile::Wall)
    }

    pub fn ghost_spawns(&self) -> Vec<GhostSpawn> {
        self.tiles
            .iter()
            .filter_map(|(cell, tile)| match tile {
                Tile::GhostSpawn(color) => Some(GhostSpawn::new(*cell, *color)),
                _ => None,
            })
            .collect()
    }

    fn cells_of(&self, wanted: Tile) -> Vec<IVec2> {
        self.tiles.iter().filter(|(_, tile)| *tile == wanted).map(|(cell, _)| *cell).collect()
    }
}

/// Parser for converting text maps into [`ParsedMap`]s.
pub struct MapParser;

impl MapParser {
    /// Parses the `W H` header line.
    pub fn parse_header(line: &str) -> Result<(i32, i32), ParseError> {
        let invalid = || ParseError::InvalidHeader(line.to_string());
        let mut parts = line.split_whitespace();
        let width: i32 = parts.next().and_then(|w| w.parse().ok()).ok_or_else(invalid)?;
        let height: i32 = parts.next().and_then(|h| h.parse().ok()).ok_or_else(invalid)?;
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        Ok((width, height))
    }

    /// Parses a whole map.
    ///
    /// # Errors
    ///
    /// Returns an error if the text has no header line or the header is not two
    /// positive integers.
    pub fn parse(text: &str) -> Result<ParsedMap, ParseError> {
        let mut lines = text.lines();
        let header = lines.next().filter(|line| !line.trim().is_empty()).ok_or(ParseError::MissingHeader)?;
        let (width, height) = Self::parse_header(header)?;

        let mut tiles = Vec::new();
        for (y, line) in lines.take(height as usize).enumerate() {
            let line = line.trim_end_matches('\r');
            if line.chars().count() > width as usize {
                warn!(row = y, width, "Map row is wider than the header, extra columns ignored");
            }
            for (x, c) in line.chars().take(width as usize).enumerate() {
                match Tile::from_char(c) {
                    Some(tile) => tiles.push((IVec2::new(x as i32, y as i32), tile)),
                    None if c != ' ' => trace!(row = y, col = x, character = %c, "Ignoring unknown map character"),
                    None => {}
                }
            }
        }

        Ok(ParsedMap { width, height, tiles })
    }
}
