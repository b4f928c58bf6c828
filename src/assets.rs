//! Asset loading
//!
//! Assets are looked up by name through an [`AssetSource`] injected at startup.
//! A missing asset is never fatal: callers get [`AssetError::Missing`] and the
//! loaded [`Assets`] bundle records a fallback instead.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::SoundEffect;
use crate::sim::Rgba;

pub const BACKGROUND_IMAGE: &str = "background.png";
pub const MUSIC_TRACK: &str = "music.wav";

/// Solid backdrop used when the background image is unavailable
pub const FALLBACK_BACKGROUND: Rgba = Rgba::rgb(0, 51, 102);

/// Asset lookup errors
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset missing: {0}")]
    Missing(String),

    #[error("failed to read asset {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Raw asset bytes addressed by name
pub trait AssetSource {
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError>;
}

/// Assets in a directory on disk
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        fs::read(self.root.join(name)).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AssetError::Missing(name.to_string())
            } else {
                AssetError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory assets, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, bytes: &[u8]) -> Self {
        self.files.insert(name.to_string(), bytes.to_vec());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::Missing(name.to_string()))
    }
}

/// Loaded image bytes
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// Loaded sound bytes
#[derive(Debug, Clone)]
pub struct SoundHandle {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// How the playfield background is drawn
#[derive(Debug, Clone)]
pub enum Backdrop {
    /// The background image loaded; draw the starfield
    Image(ImageHandle),
    /// Solid colour fallback
    Solid(Rgba),
}

/// Sounds that loaded; anything absent plays silently
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    effects: HashMap<SoundEffect, SoundHandle>,
    music: Option<SoundHandle>,
}

impl SoundBank {
    pub fn get(&self, effect: SoundEffect) -> Option<&SoundHandle> {
        self.effects.get(&effect)
    }

    pub fn music(&self) -> Option<&SoundHandle> {
        self.music.as_ref()
    }

    /// Bank with every sound present, for backends that synthesize their own
    pub fn all_present() -> Self {
        let effects = SoundEffect::ALL
            .iter()
            .map(|&e| {
                let handle = SoundHandle {
                    name: e.file_name().to_string(),
                    bytes: Arc::from(Vec::<u8>::new()),
                };
                (e, handle)
            })
            .collect();
        Self {
            effects,
            music: Some(SoundHandle {
                name: MUSIC_TRACK.to_string(),
                bytes: Arc::from(Vec::<u8>::new()),
            }),
        }
    }
}

/// Everything loaded at startup
#[derive(Debug, Clone)]
pub struct Assets {
    pub backdrop: Backdrop,
    pub sounds: SoundBank,
}

impl Assets {
    /// Load every known asset, logging and substituting fallbacks for failures
    pub fn load(source: &dyn AssetSource) -> Self {
        let backdrop = match load_image(source, BACKGROUND_IMAGE) {
            Ok(image) => Backdrop::Image(image),
            Err(e) => {
                log::warn!("{e}; using solid background");
                Backdrop::Solid(FALLBACK_BACKGROUND)
            }
        };

        let mut sounds = SoundBank::default();
        for &effect in SoundEffect::ALL.iter() {
            match load_sound(source, effect.file_name()) {
                Ok(handle) => {
                    sounds.effects.insert(effect, handle);
                }
                Err(e) => log::warn!("{e}; {effect:?} will be silent"),
            }
        }
        match load_sound(source, MUSIC_TRACK) {
            Ok(handle) => sounds.music = Some(handle),
            Err(e) => log::warn!("{e}; music disabled"),
        }

        Self { backdrop, sounds }
    }
}

pub fn load_image(source: &dyn AssetSource, name: &str) -> Result<ImageHandle, AssetError> {
    let bytes = source.read(name)?;
    Ok(ImageHandle {
        name: name.to_string(),
        bytes: Arc::from(bytes),
    })
}

pub fn load_sound(source: &dyn AssetSource, name: &str) -> Result<SoundHandle, AssetError> {
    let bytes = source.read(name)?;
    Ok(SoundHandle {
        name: name.to_string(),
        bytes: Arc::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_everything_falls_back() {
        let assets = Assets::load(&MemoryAssets::new());
        assert!(matches!(assets.backdrop, Backdrop::Solid(c) if c == FALLBACK_BACKGROUND));
        assert!(assets.sounds.get(SoundEffect::Shoot).is_none());
        assert!(assets.sounds.music().is_none());
    }

    #[test]
    fn test_partial_load() {
        let source = MemoryAssets::new()
            .with(BACKGROUND_IMAGE, b"png")
            .with(SoundEffect::Hit.file_name(), b"wav");
        let assets = Assets::load(&source);
        assert!(matches!(assets.backdrop, Backdrop::Image(_)));
        assert!(assets.sounds.get(SoundEffect::Hit).is_some());
        assert!(assets.sounds.get(SoundEffect::Destroy).is_none());
    }

    #[test]
    fn test_dir_assets_reports_missing() {
        let dir = DirAssets::new(std::env::temp_dir().join("rocket-man-no-such-assets"));
        assert!(matches!(dir.read("nothing.png"), Err(AssetError::Missing(n)) if n == "nothing.png"));
    }
}
