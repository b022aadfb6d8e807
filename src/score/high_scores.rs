//! High score leaderboard.
//!
//! Persisted as plain text, one `NAME SCORE` entry per line, best first.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::constants::{MAX_HIGH_SCORES, MAX_NAME_LENGTH};
use crate::error::GameResult;

/// A single leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
}

impl HighScoreEntry {
    /// Creates an entry, squeezing `name` into a single token of at most
    /// [`MAX_NAME_LENGTH`] characters.
    pub fn new(name: &str, score: u32) -> Self {
        let name: String = name.chars().filter(|c| !c.is_whitespace()).take(MAX_NAME_LENGTH).collect();
        let name = if name.is_empty() { "ANON".to_string() } else { name };
        Self { name, score }
    }
}

/// Top-N leaderboard, sorted descending by score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Whether `score` would make it onto the board.
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// The rank a score would achieve (1-indexed), or `None` if it doesn't qualify.
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Appends an entry, re-sorts and drops everything past the board size.
    ///
    /// Returns whether the new entry is still on the board. Ties rank below the
    /// entries already there.
    pub fn insert(&mut self, name: &str, score: u32) -> bool {
        let kept = self.qualifies(score);
        self.entries.push(HighScoreEntry::new(name, score));
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        kept
    }

    /// Parses the text format, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let mut scores = Self::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next().and_then(|s| s.parse::<u32>().ok()), parts.next()) {
                (Some(name), Some(score), None) => {
                    scores.insert(name, score);
                }
                _ => warn!(line = number + 1, content = line, "Skipping malformed high score line"),
            }
        }
        scores
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            let _ = writeln!(text, "{} {}", entry.name, entry.score);
        }
        text
    }

    /// Reads the board from `path`. A missing file is an empty board.
    pub fn load(path: &Path) -> GameResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let scores = Self::parse(&text);
                debug!(path = %path.display(), entries = scores.entries.len(), "Loaded high scores");
                Ok(scores)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites `path` with the board.
    pub fn save(&self, path: &Path) -> GameResult<()> {
        fs::write(path, self.to_text())?;
        debug!(path = %path.display(), entries = self.entries.len(), "Saved high scores");
        Ok(())
    }
}
