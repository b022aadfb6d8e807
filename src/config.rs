use std::path::PathBuf;

use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;

use crate::constants::DEFAULT_LIVES;
use crate::error::{GameError, GameResult};

/// Session configuration, read from `PACMAN_`-prefixed environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Map loaded for every level
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
    /// Leaderboard file
    #[serde(default = "default_high_score_path")]
    pub high_score_path: PathBuf,
    #[serde(default = "default_starting_lives")]
    pub starting_lives: i32,
    /// PRNG seed; OS entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// Name recorded on the leaderboard
    #[serde(default = "default_player_name")]
    pub player_name: String,
    /// Upper bound on frames simulated by the driver
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,
    /// Pace the driver loop to real time instead of running flat out
    #[serde(default)]
    pub realtime: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
            high_score_path: default_high_score_path(),
            starting_lives: default_starting_lives(),
            seed: None,
            player_name: default_player_name(),
            max_frames: default_max_frames(),
            realtime: false,
        }
    }
}

fn default_map_path() -> PathBuf {
    PathBuf::from("assets/maps/level1.txt")
}

fn default_high_score_path() -> PathBuf {
    PathBuf::from("highscores.txt")
}

fn default_starting_lives() -> i32 {
    DEFAULT_LIVES
}

fn default_player_name() -> String {
    "PLAYER".to_string()
}

fn default_max_frames() -> u64 {
    36_000
}

impl Config {
    /// Extracts and validates a config from any figment.
    pub fn from_figment(figment: Figment) -> GameResult<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> GameResult<()> {
        if self.starting_lives <= 0 {
            return Err(GameError::Config(format!(
                "starting_lives must be positive, got {}",
                self.starting_lives
            )));
        }
        if self.max_frames == 0 {
            return Err(GameError::Config("max_frames must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn load_config() -> GameResult<Config> {
    Config::from_figment(Figment::new().merge(Env::prefixed("PACMAN_")))
}
