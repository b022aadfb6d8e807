//! Headless Pac-Man world simulation library crate.

pub mod clock;
pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod events;
pub mod factory;
pub mod formatter;
pub mod lives;
pub mod map;
pub mod rng;
pub mod score;
pub mod world;
