//! Top-level error type for process wiring

use thiserror::Error;

use crate::assets::AssetError;
use crate::highscores::PersistError;
use crate::render::terminal::OutputError;
use crate::settings::SettingsError;

/// Errors that can stop the binary before or after the game runs
#[derive(Debug, Error)]
pub enum AppError {
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("high score: {0}")]
    Persist(#[from] PersistError),

    #[error("assets: {0}")]
    Asset(#[from] AssetError),

    #[error("terminal: {0}")]
    Output(#[from] OutputError),

    #[error("logger setup failed: {0}")]
    Logger(String),

    /// The game loop thread could not be started or joined
    #[error("game loop: {0}")]
    GameLoop(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the binary
pub type Result<T> = std::result::Result<T, AppError>;
