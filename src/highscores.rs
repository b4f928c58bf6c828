//! High score record
//!
//! A single best score persisted as one `name:score` line in a plain text file.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default high score file, relative to the working directory
pub const DEFAULT_HIGHSCORE_PATH: &str = "highscore.txt";

/// High score persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed high score record: {0:?}")]
    Malformed(String),
}

/// The best score on record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub name: String,
    pub score: u32,
}

impl Default for HighScore {
    fn default() -> Self {
        Self {
            name: "None".to_string(),
            score: 0,
        }
    }
}

impl HighScore {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

impl fmt::Display for HighScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.score)
    }
}

impl FromStr for HighScore {
    type Err = PersistError;

    /// Parse the first line as `name:score`. The score follows the last colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.lines().next().unwrap_or("").trim();
        let (name, score) = line
            .rsplit_once(':')
            .ok_or_else(|| PersistError::Malformed(line.to_string()))?;
        let score = score
            .trim()
            .parse::<u32>()
            .map_err(|_| PersistError::Malformed(line.to_string()))?;
        Ok(Self::new(name, score))
    }
}

/// Somewhere a high score can be loaded from and saved to
pub trait ScoreStore: Send {
    /// Load the record; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<HighScore>, PersistError>;

    fn save(&self, record: &HighScore) -> Result<(), PersistError>;

    /// Load, falling back to the default record on any failure
    fn load_or_default(&self) -> HighScore {
        match self.load() {
            Ok(Some(record)) => {
                log::info!("Loaded high score {record}");
                record
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                HighScore::default()
            }
            Err(e) => {
                log::warn!("Failed to load high score, using default: {e}");
                HighScore::default()
            }
        }
    }

    /// Save, logging and swallowing any failure
    fn save_logged(&self, record: &HighScore) {
        match self.save(record) {
            Ok(()) => log::info!("High score saved ({record})"),
            Err(e) => log::warn!("Failed to save high score: {e}"),
        }
    }
}

/// Plain text file store
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> Result<Option<HighScore>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.parse().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &HighScore) -> Result<(), PersistError> {
        fs::write(&self.path, format!("{record}\n"))?;
        Ok(())
    }
}

/// In-memory store for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    record: Mutex<Option<HighScore>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored record
    pub fn get(&self) -> Option<HighScore> {
        self.record.lock().ok().and_then(|r| r.clone())
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> Result<Option<HighScore>, PersistError> {
        Ok(self.get())
    }

    fn save(&self, record: &HighScore) -> Result<(), PersistError> {
        if let Ok(mut slot) = self.record.lock() {
            *slot = Some(record.clone());
        }
        Ok(())
    }
}

impl<S: ScoreStore + Sync> ScoreStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<HighScore>, PersistError> {
        (**self).load()
    }

    fn save(&self, record: &HighScore) -> Result<(), PersistError> {
        (**self).save(record)
    }
}
