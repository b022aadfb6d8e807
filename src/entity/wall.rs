use glam::{IVec2, Vec2};

use crate::constants::WALL_SIZE;
use crate::entity::{Body, Entity, EntityKind};

/// A static wall occupying exactly one cell. Walls never move and never die.
#[derive(Debug)]
pub struct Wall {
    body: Body,
}

impl Wall {
    pub fn new(position: Vec2) -> Self {
        Self {
            body: Body::new(position, WALL_SIZE),
        }
    }

    /// The cell this wall occupies, taken from its top-left corner.
    pub fn cell(&self) -> IVec2 {
        self.body.position().floor().as_ivec2()
    }
}

impl Entity for Wall {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Wall
    }
}
