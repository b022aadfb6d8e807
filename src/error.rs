//! Centralized error types for the simulation.
//!
//! The world never panics across component boundaries; fallible operations
//! return a [`GameResult`] and the caller decides what to show.

use std::io;

/// Main error type for the simulation.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type for map parsing operations.
///
/// Only the header is validated; malformed body lines are skipped.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Map is empty, expected a 'W H' header line")]
    MissingHeader,
    #[error("Invalid map header: {0:?}")]
    InvalidHeader(String),
}

impl From<figment::Error> for GameError {
    fn from(error: figment::Error) -> Self {
        GameError::Config(error.to_string())
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
