use glam::Vec2;

use crate::constants::{COIN_SIZE, FRUIT_SIZE};
use crate::entity::{Body, Entity, EntityKind};
use crate::events::GameEvent;

/// The two kinds of collectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Coin,
    /// Power pellet; collecting one frightens every ghost.
    Fruit,
}

impl ItemKind {
    pub const fn size(self) -> f32 {
        match self {
            ItemKind::Coin => COIN_SIZE,
            ItemKind::Fruit => FRUIT_SIZE,
        }
    }

    /// The event announced when Pac-Man picks this up.
    pub const fn event(self) -> GameEvent {
        match self {
            ItemKind::Coin => GameEvent::CoinCollected,
            ItemKind::Fruit => GameEvent::FruitCollected,
        }
    }
}

/// A coin or fruit sitting in the middle of a cell.
#[derive(Debug)]
pub struct Item {
    body: Body,
    item_kind: ItemKind,
}

impl Item {
    pub fn new(position: Vec2, item_kind: ItemKind) -> Self {
        Self {
            body: Body::new(position, item_kind.size()),
            item_kind,
        }
    }

    pub fn coin(position: Vec2) -> Self {
        Self::new(position, ItemKind::Coin)
    }

    pub fn fruit(position: Vec2) -> Self {
        Self::new(position, ItemKind::Fruit)
    }

    pub fn item_kind(&self) -> ItemKind {
        self.item_kind
    }

    /// Announces the pickup and marks the item dead. Collecting twice is a no-op.
    pub fn collect(&mut self) {
        if self.body.is_dead() {
            return;
        }
        self.body.notify(self.item_kind.event());
        self.body.mark_dead();
    }
}

impl Entity for Item {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> EntityKind {
        match self.item_kind {
            ItemKind::Coin => EntityKind::Coin,
            ItemKind::Fruit => EntityKind::Fruit,
        }
    }
}
