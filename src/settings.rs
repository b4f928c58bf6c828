//! Game settings and preferences
//!
//! Stored as JSON next to the game (`rocket-man.json`), or wherever
//! `ROCKET_MAN_SETTINGS` points. Gameplay tuning stays in `consts`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::highscores::DEFAULT_HIGHSCORE_PATH;

/// Default settings file name
pub const SETTINGS_FILE: &str = "rocket-man.json";
/// Environment variable overriding the settings path
pub const SETTINGS_ENV: &str = "ROCKET_MAN_SETTINGS";

/// Settings persistence errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    /// Logical playfield width in pixels
    pub width: f32,
    /// Logical playfield height in pixels
    pub height: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Ring the terminal bell for sound effects
    pub terminal_bell: bool,

    // === Files ===
    pub highscore_path: PathBuf,
    pub assets_dir: PathBuf,
    pub log_file: PathBuf,

    /// Fixed RNG seed; a clock-derived seed is used when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            terminal_bell: false,

            highscore_path: PathBuf::from(DEFAULT_HIGHSCORE_PATH),
            assets_dir: PathBuf::from("assets"),
            log_file: PathBuf::from("rocket-man.log"),

            seed: None,
        }
    }
}

impl Settings {
    /// Where settings are read from and written to
    pub fn path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
    }

    /// Load settings, falling back to defaults on a missing or bad file
    pub fn load() -> Self {
        Self::load_or_create(&Self::path())
    }

    /// A missing file is created with the defaults so there is something to
    /// edit. A malformed file is left alone.
    pub fn load_or_create(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                let settings = Self::default();
                if let Err(e) = settings.save_to(path) {
                    log::warn!("Could not write default settings to {}: {e}", path.display());
                }
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Read a settings file; `Ok(None)` when it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, SettingsError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings: Self = serde_json::from_str(&json)?;
        Ok(Some(settings.sanitized()))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp out-of-range values back into something playable
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        if !(self.width.is_finite() && self.width >= 200.0) {
            self.width = DEFAULT_WIDTH;
        }
        if !(self.height.is_finite() && self.height >= 200.0) {
            self.height = DEFAULT_HEIGHT;
        }
        self
    }

    /// Seed for this run
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rocket-man-settings-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.width, 1366.0);
        assert_eq!(s.height, 768.0);
        assert_eq!(s.highscore_path, PathBuf::from("highscore.txt"));
        assert!(s.seed.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("round-trip");
        let settings = Settings {
            seed: Some(7),
            muted: true,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Some(settings));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{ "width": 1024.0, "sfx_volume": 3.0 }"#).unwrap();
        let loaded = Settings::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.width, 1024.0);
        assert_eq!(loaded.height, DEFAULT_HEIGHT);
        assert_eq!(loaded.sfx_volume, 1.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let path = temp_path("malformed");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Json(_))));
        assert_eq!(Settings::load_or_create(&path), Settings::default());
        // Left as the user wrote it
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ nope");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("missing-never-written");
        assert!(Settings::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let path = temp_path("first-run");
        let _ = fs::remove_file(&path);
        assert_eq!(Settings::load_or_create(&path), Settings::default());
        assert_eq!(Settings::load_from(&path).unwrap(), Some(Settings::default()));
        let _ = fs::remove_file(&path);
    }
}
