//! Entity models for everything that lives on the grid.
//!
//! Every model shares a [`Body`] (position, fixed size, direction, dead flag and its own
//! event [`Subject`]). The world stores models as the tagged [`WorldEntity`] variant and
//! classifies them by [`EntityKind`], never by their size.

pub mod direction;
pub mod ghost;
pub mod item;
pub mod pacman;
pub mod wall;

use std::sync::atomic::{AtomicU32, Ordering};

use glam::{IVec2, Vec2};

use crate::constants::{COIN_SIZE, FRUIT_SIZE, GHOST_SIZE, PLAYER_SIZE, WALL_SIZE};
use crate::events::{GameEvent, SharedObserver, Subject};

use self::direction::Direction;
use self::ghost::Ghost;
use self::item::Item;
use self::pacman::Pacman;
use self::wall::Wall;

static NEXT_ENTITY_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of a model, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// The kinds of models the world knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Wall,
    Coin,
    Fruit,
    Pacman,
    Ghost,
}

impl EntityKind {
    /// Edge length of this kind of entity, in grid units.
    pub const fn size(self) -> f32 {
        match self {
            EntityKind::Wall => WALL_SIZE,
            EntityKind::Coin => COIN_SIZE,
            EntityKind::Fruit => FRUIT_SIZE,
            EntityKind::Pacman => PLAYER_SIZE,
            EntityKind::Ghost => GHOST_SIZE,
        }
    }

    /// Whether Pac-Man has to pick this up to clear the level.
    pub const fn is_collectable(self) -> bool {
        matches!(self, EntityKind::Coin | EntityKind::Fruit)
    }
}

/// State shared by every model.
#[derive(Debug)]
pub struct Body {
    id: EntityId,
    /// Top-left corner, in grid units.
    position: Vec2,
    size: f32,
    direction: Option<Direction>,
    dead: bool,
    subject: Subject,
}

impl Body {
    pub fn new(position: Vec2, size: f32) -> Self {
        Self {
            id: EntityId::next(),
            position,
            size,
            direction: None,
            dead: false,
            subject: Subject::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.size / 2.0)
    }

    /// Moves the body so that its center lands on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - Vec2::splat(self.size / 2.0);
    }

    /// The cell containing the body's center.
    pub fn grid_cell(&self) -> IVec2 {
        self.center().floor().as_ivec2()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// Axis-aligned box overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Body) -> bool {
        let a_max = self.position + Vec2::splat(self.size);
        let b_max = other.position + Vec2::splat(other.size);
        self.position.x < b_max.x && other.position.x < a_max.x && self.position.y < b_max.y && other.position.y < a_max.y
    }

    pub fn subject_mut(&mut self) -> &mut Subject {
        &mut self.subject
    }

    pub fn notify(&mut self, event: GameEvent) {
        self.subject.notify(event);
    }
}

/// Common read access for every model.
pub trait Entity {
    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    fn kind(&self) -> EntityKind;

    fn id(&self) -> EntityId {
        self.body().id()
    }

    fn position(&self) -> Vec2 {
        self.body().position()
    }

    fn center(&self) -> Vec2 {
        self.body().center()
    }

    fn grid_cell(&self) -> IVec2 {
        self.body().grid_cell()
    }

    fn direction(&self) -> Option<Direction> {
        self.body().direction()
    }

    fn is_dead(&self) -> bool {
        self.body().is_dead()
    }

    /// Subscribes `observer` to this model's events.
    fn attach(&mut self, observer: &SharedObserver) {
        self.body_mut().subject_mut().attach(observer);
    }

    fn detach(&mut self, observer: &SharedObserver) {
        self.body_mut().subject_mut().detach(observer);
    }
}

/// A model owned by the world.
#[derive(Debug)]
pub enum WorldEntity {
    Wall(Wall),
    Item(Item),
    Pacman(Pacman),
    Ghost(Ghost),
}

impl WorldEntity {
    pub fn as_pacman(&self) -> Option<&Pacman> {
        match self {
            WorldEntity::Pacman(pacman) => Some(pacman),
            _ => None,
        }
    }

    pub fn as_pacman_mut(&mut self) -> Option<&mut Pacman> {
        match self {
            WorldEntity::Pacman(pacman) => Some(pacman),
            _ => None,
        }
    }

    pub fn as_ghost(&self) -> Option<&Ghost> {
        match self {
            WorldEntity::Ghost(ghost) => Some(ghost),
            _ => None,
        }
    }

    pub fn as_ghost_mut(&mut self) -> Option<&mut Ghost> {
        match self {
            WorldEntity::Ghost(ghost) => Some(ghost),
            _ => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut Item> {
        match self {
            WorldEntity::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl Entity for WorldEntity {
    fn body(&self) -> &Body {
        match self {
            WorldEntity::Wall(wall) => wall.body(),
            WorldEntity::Item(item) => item.body(),
            WorldEntity::Pacman(pacman) => pacman.body(),
            WorldEntity::Ghost(ghost) => ghost.body(),
        }
    }

    fn body_mut(&mut self) -> &mut Body {
        match self {
            WorldEntity::Wall(wall) => wall.body_mut(),
            WorldEntity::Item(item) => item.body_mut(),
            WorldEntity::Pacman(pacman) => pacman.body_mut(),
            WorldEntity::Ghost(ghost) => ghost.body_mut(),
        }
    }

    fn kind(&self) -> EntityKind {
        match self {
            WorldEntity::Wall(wall) => wall.kind(),
            WorldEntity::Item(item) => item.kind(),
            WorldEntity::Pacman(pacman) => pacman.kind(),
            WorldEntity::Ghost(ghost) => ghost.kind(),
        }
    }
}

impl From<Wall> for WorldEntity {
    fn from(wall: Wall) -> Self {
        WorldEntity::Wall(wall)
    }
}

impl From<Item> for WorldEntity {
    fn from(item: Item) -> Self {
        WorldEntity::Item(item)
    }
}

impl From<Pacman> for WorldEntity {
    fn from(pacman: Pacman) -> Self {
        WorldEntity::Pacman(pacman)
    }
}

impl From<Ghost> for WorldEntity {
    fn from(ghost: Ghost) -> Self {
        WorldEntity::Ghost(ghost)
    }
}
