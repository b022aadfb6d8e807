//! Scoring: event-driven increments, a continuous time penalty and the leaderboard.

pub mod high_scores;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::constants::{
    COIN_BASE_POINTS, COIN_DECAY_FACTOR, COIN_DECAY_INTERVAL, FRUIT_POINTS, GHOST_POINTS, LEVEL_CLEARED_POINTS,
    SCORE_DECAY_PER_SECOND,
};
use crate::events::{GameEvent, Observer};

pub use high_scores::{HighScoreEntry, HighScores};

/// Points for a coin collected `since_last` seconds after the previous one.
///
/// Quick successions are worth the most; the value shrinks geometrically and may reach zero.
pub fn coin_points(since_last: f32) -> u32 {
    let points = COIN_BASE_POINTS * COIN_DECAY_FACTOR.powf(since_last.max(0.0) / COIN_DECAY_INTERVAL);
    points.floor() as u32
}

/// The running score of a session.
///
/// Time is measured in simulated seconds, accumulated through [`Score::update_score_decay`].
#[derive(Debug)]
pub struct Score {
    current: u32,
    /// Simulated seconds of gameplay seen so far
    clock: f32,
    last_coin_time: Option<f32>,
    /// Fractional points owed to the time penalty
    points_lost: f32,
    high_scores: HighScores,
    path: Option<PathBuf>,
}

impl Score {
    /// Creates a score backed by the leaderboard file at `path`.
    ///
    /// A missing file starts an empty board. An unreadable one is logged and also
    /// starts empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let high_scores = HighScores::load(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Could not read high scores");
            HighScores::new()
        });
        Self {
            path: Some(path),
            ..Self::with_high_scores(high_scores)
        }
    }

    /// A score whose leaderboard is never written to disk.
    pub fn in_memory() -> Self {
        Self::with_high_scores(HighScores::new())
    }

    fn with_high_scores(high_scores: HighScores) -> Self {
        Self {
            current: 0,
            clock: 0.0,
            last_coin_time: None,
            points_lost: 0.0,
            high_scores,
            path: None,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Starts a new game: zero points, fresh coin timer. The leaderboard stays.
    pub fn reset(&mut self) {
        self.current = 0;
        self.clock = 0.0;
        self.last_coin_time = None;
        self.points_lost = 0.0;
    }

    fn add(&mut self, points: u32) {
        self.current = self.current.saturating_add(points);
    }

    /// Drains [`SCORE_DECAY_PER_SECOND`] points per simulated second.
    pub fn update_score_decay(&mut self, dt: f32) {
        self.clock += dt;
        self.points_lost += SCORE_DECAY_PER_SECOND * dt;

        let whole = self.points_lost.trunc();
        if whole < 1.0 {
            return;
        }
        self.points_lost -= whole;
        let whole = whole as u32;
        if whole > self.current {
            self.current = 0;
            self.points_lost = 0.0;
        } else {
            self.current -= whole;
        }
    }

    fn collect_coin(&mut self) {
        let since_last = self.last_coin_time.map_or(0.0, |last| self.clock - last);
        self.add(coin_points(since_last));
        self.last_coin_time = Some(self.clock);
    }

    pub fn is_high_score(&self, score: u32) -> bool {
        self.high_scores.qualifies(score)
    }

    /// Records `score` on the leaderboard and persists it. Returns whether the
    /// entry made it onto the board; a score that doesn't is not written.
    ///
    /// A write failure is logged; the in-memory board is kept either way.
    pub fn add_high_score(&mut self, name: &str, score: u32) -> bool {
        if !self.high_scores.insert(name, score) {
            debug!(name, score, "Score did not make the leaderboard");
            return false;
        }
        info!(name, score, "New high score");
        if let Some(path) = &self.path {
            if let Err(e) = self.high_scores.save(path) {
                warn!(path = %path.display(), error = %e, "Could not write high scores");
            }
        }
        true
    }
}

impl Observer for Score {
    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::CoinCollected => self.collect_coin(),
            GameEvent::FruitCollected => self.add(FRUIT_POINTS),
            GameEvent::GhostEaten => self.add(GHOST_POINTS),
            GameEvent::LevelCleared => self.add(LEVEL_CLEARED_POINTS),
            GameEvent::PacmanDied | GameEvent::DirectionChanged | GameEvent::WallHit => return,
        }
        debug!(%event, score = self.current, "Score updated");
    }
}
