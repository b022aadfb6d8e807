//! Static grid facts the movement code queries every frame.

use glam::IVec2;

use crate::map::manhattan;

/// Inclusive rectangle of cells ghosts start in and may not re-enter once they left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnArea {
    pub min: IVec2,
    pub max: IVec2,
}

impl SpawnArea {
    /// The house of the classic 21x21 board.
    pub const CLASSIC: SpawnArea = SpawnArea {
        min: IVec2::new(7, 8),
        max: IVec2::new(11, 10),
    };

    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Bounding box of `cells`, grown by one cell on every side.
    ///
    /// Returns `None` when there are no cells.
    pub fn around(cells: &[IVec2]) -> Option<SpawnArea> {
        let first = *cells.first()?;
        let (min, max) = cells.iter().fold((first, first), |(min, max), &cell| (min.min(cell), max.max(cell)));
        Some(SpawnArea {
            min: min - IVec2::ONE,
            max: max + IVec2::ONE,
        })
    }

    /// The house around `ghosts`: [`SpawnArea::around`], with edges pulled in until
    /// none of the `outside` cells (exit markers, the player spawn) lie within it.
    ///
    /// Only the grown border ring can be given up; a cell inside the ghosts' own
    /// bounding box stays in the area.
    pub fn derive(ghosts: &[IVec2], outside: &[IVec2]) -> Option<SpawnArea> {
        let mut area = Self::around(ghosts)?;
        let inner = SpawnArea {
            min: area.min + IVec2::ONE,
            max: area.max - IVec2::ONE,
        };
        for &cell in outside {
            if !area.contains(cell) || inner.contains(cell) {
                continue;
            }
            if cell.y < inner.min.y {
                area.min.y = inner.min.y;
            } else if cell.y > inner.max.y {
                area.max.y = inner.max.y;
            } else if cell.x < inner.min.x {
                area.min.x = inner.min.x;
            } else {
                area.max.x = inner.max.x;
            }
        }
        Some(area)
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }
}

/// Wall grid, exit markers and spawn area of a loaded level.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    exits: Vec<IVec2>,
    spawn_area: Option<SpawnArea>,
}

impl Layout {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            walls: vec![false; (width * height) as usize],
            exits: Vec::new(),
            spawn_area: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        self.contains(cell).then(|| (cell.y * self.width + cell.x) as usize)
    }

    /// Marks `cell` as walled. Cells outside the grid are ignored.
    pub fn set_wall(&mut self, cell: IVec2) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = true;
        }
    }

    /// Whether a wall occupies `cell`. Cells outside the grid hold no wall.
    pub fn has_wall(&self, cell: IVec2) -> bool {
        self.index(cell).is_some_and(|index| self.walls[index])
    }

    pub fn add_exit(&mut self, cell: IVec2) {
        self.exits.push(cell);
    }

    pub fn exits(&self) -> &[IVec2] {
        &self.exits
    }

    pub fn is_exit(&self, cell: IVec2) -> bool {
        self.exits.contains(&cell)
    }

    /// Distance from `cell` to the closest exit marker, if there is one.
    pub fn nearest_exit_distance(&self, cell: IVec2) -> Option<i32> {
        self.exits.iter().map(|&exit| manhattan(cell, exit)).min()
    }

    pub fn spawn_area(&self) -> Option<SpawnArea> {
        self.spawn_area
    }

    pub fn set_spawn_area(&mut self, spawn_area: Option<SpawnArea>) {
        self.spawn_area = spawn_area;
    }

    pub fn in_spawn_area(&self, cell: IVec2) -> bool {
        self.spawn_area.is_some_and(|area| area.contains(cell))
    }
}
