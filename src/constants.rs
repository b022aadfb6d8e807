//! This module contains all the constants used by the simulation.
//!
//! All distances are in grid units (one cell is `1.0`), all durations in seconds.

use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Edge length of a wall, in grid units.
pub const WALL_SIZE: f32 = 1.0;
/// Edge length of a coin.
pub const COIN_SIZE: f32 = 0.02;
/// Edge length of a fruit (power pellet).
pub const FRUIT_SIZE: f32 = 0.03;
/// Edge length of Pac-Man.
pub const PLAYER_SIZE: f32 = 0.8;
/// Edge length of a ghost.
pub const GHOST_SIZE: f32 = 0.8;

/// Pac-Man's default speed, in cells per second.
pub const PLAYER_SPEED: f32 = 4.0;
/// A ghost's speed at level 1 before the level multiplier is applied.
pub const GHOST_BASE_SPEED: f32 = 2.5;
/// Speed of a frightened ghost, independent of level.
pub const GHOST_FEAR_SPEED: f32 = 1.5;

/// How close (per axis) a ghost's center must be to its cell center to make a decision.
pub const GHOST_CENTER_TOLERANCE: f32 = 0.1;
/// Lower bound of the player's center tolerance; it grows with `speed * dt`.
pub const PLAYER_CENTER_TOLERANCE: f32 = 0.15;
/// How many cells ahead of Pac-Man an ambusher aims.
pub const AMBUSH_LOOKAHEAD: i32 = 4;

/// Length of the READY pause after a level load or a respawn.
pub const READY_DURATION: f32 = 4.7;
/// Length of the death animation.
pub const DEATH_ANIMATION_DURATION: f32 = 2.0;
/// Length of the level-cleared display.
pub const LEVEL_CLEARED_DURATION: f32 = 3.0;
/// Fear mode length at level 1.
pub const FEAR_BASE_DURATION: f32 = 7.0;
/// Remaining fear time at which ghosts start signalling that fear is about to end.
pub const FEAR_ENDING_THRESHOLD: f32 = 2.0;

/// Per-level increase of the ghost speed multiplier.
pub const GHOST_SPEED_STEP: f32 = 0.09;
/// Per-level decrease of the fear duration multiplier.
pub const FEAR_DURATION_STEP: f32 = 0.09;
/// Level after which fear duration stops shrinking.
pub const FEAR_DURATION_LEVEL_CAP: u32 = 6;

/// Points for a coin collected immediately after the previous one.
pub const COIN_BASE_POINTS: f32 = 30.0;
/// Multiplicative decay applied to coin points per [`COIN_DECAY_INTERVAL`] elapsed.
pub const COIN_DECAY_FACTOR: f32 = 0.9;
/// Time span over which [`COIN_DECAY_FACTOR`] is applied once.
pub const COIN_DECAY_INTERVAL: f32 = 0.5;
pub const FRUIT_POINTS: u32 = 50;
pub const GHOST_POINTS: u32 = 200;
pub const LEVEL_CLEARED_POINTS: u32 = 1000;
/// Points drained from the score every second of normal gameplay.
pub const SCORE_DECAY_PER_SECOND: f32 = 10.0;

/// Number of entries kept on the leaderboard.
pub const MAX_HIGH_SCORES: usize = 5;
/// Longest name stored on the leaderboard.
pub const MAX_NAME_LENGTH: usize = 10;

/// Lives granted at the start of a new game.
pub const DEFAULT_LIVES: i32 = 3;
