//! Pac-Man entity implementation.
//!
//! Pac-Man only knows how to move along its current direction. Deciding when a
//! queued turn may be taken, and stopping at walls, is done by the world.

use glam::Vec2;

use crate::constants::{PLAYER_SIZE, PLAYER_SPEED};
use crate::entity::direction::Direction;
use crate::entity::{Body, Entity, EntityKind};
use crate::events::GameEvent;

/// The player character.
#[derive(Debug)]
pub struct Pacman {
    body: Body,
    /// Movement speed in cells per second
    speed: f32,
    /// Direction the player asked for, taken at the next legal moment
    desired: Option<Direction>,
    spawn: Vec2,
}

impl Pacman {
    /// Creates Pac-Man at `position`, which also becomes its respawn anchor.
    ///
    /// Pac-Man starts out facing left, as in the arcade.
    pub fn new(position: Vec2) -> Self {
        let mut body = Body::new(position, PLAYER_SIZE);
        body.set_direction(Some(Direction::Left));
        Self {
            body,
            speed: PLAYER_SPEED,
            desired: None,
            spawn: position,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn desired_direction(&self) -> Option<Direction> {
        self.desired
    }

    /// Stores the player's intent. No validation happens here.
    pub fn set_desired_direction(&mut self, direction: Option<Direction>) {
        self.desired = direction;
    }

    /// Changes the current direction, announcing it when it actually changed.
    pub fn set_direction(&mut self, direction: Option<Direction>) {
        if self.body.direction() != direction {
            self.body.set_direction(direction);
            self.body.notify(GameEvent::DirectionChanged);
        }
    }

    /// Advances along the current direction when `can_move` is set.
    pub fn update(&mut self, dt: f32, can_move: bool) {
        if !can_move {
            return;
        }
        if let Some(direction) = self.body.direction() {
            self.body.translate(direction.as_vec2() * self.speed * dt);
        }
    }

    /// Puts Pac-Man back on its spawn, facing left with no queued turn.
    pub fn respawn(&mut self) {
        self.body.set_position(self.spawn);
        self.body.set_direction(Some(Direction::Left));
        self.desired = None;
        self.body.notify(GameEvent::DirectionChanged);
    }

    pub fn die(&mut self) {
        self.body.notify(GameEvent::PacmanDied);
    }

    pub fn hit_wall(&mut self) {
        self.body.notify(GameEvent::WallHit);
    }
}

impl Entity for Pacman {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Pacman
    }
}
