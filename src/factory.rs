//! Construction of entity models.
//!
//! The world asks a factory for every model it places while loading a map. A
//! rendering front end supplies its own factory to attach a view to each model's
//! event bus; [`HeadlessFactory`] attaches nothing.

use glam::Vec2;

use crate::entity::ghost::{Ghost, GhostColor, Personality};
use crate::entity::item::Item;
use crate::entity::pacman::Pacman;
use crate::entity::wall::Wall;
use crate::entity::EntityId;

pub trait EntityFactory {
    fn create_pacman(&mut self, position: Vec2) -> Pacman {
        Pacman::new(position)
    }

    fn create_ghost(
        &mut self,
        position: Vec2,
        personality: Personality,
        color: GhostColor,
        wait_time: f32,
        speed_multiplier: f32,
    ) -> Ghost {
        Ghost::new(position, personality, color, wait_time, speed_multiplier)
    }

    fn create_wall(&mut self, position: Vec2) -> Wall {
        Wall::new(position)
    }

    fn create_coin(&mut self, position: Vec2) -> Item {
        Item::coin(position)
    }

    fn create_fruit(&mut self, position: Vec2) -> Item {
        Item::fruit(position)
    }

    /// Called right before the world drops the models in `dead`, so views can go first.
    fn remove_dead_views(&mut self, dead: &[EntityId]) {
        let _ = dead;
    }
}

/// A factory that creates bare models with no views.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessFactory;

impl EntityFactory for HeadlessFactory {}
