//! Audio playback
//!
//! The simulation only ever asks for a sound by kind. [`AudioManager`] hands
//! requests to a worker thread so a slow or failing backend can never stall
//! the game loop; failures are logged there and dropped.

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{SoundBank, SoundHandle};
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Small bullet fired (player or rocket)
    Shoot,
    /// Non-lethal hit, or health restored
    Hit,
    /// Rocket or player destroyed
    Destroy,
    /// Large bullet fired
    BigBullet,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 4] = [
        SoundEffect::Shoot,
        SoundEffect::Hit,
        SoundEffect::Destroy,
        SoundEffect::BigBullet,
    ];

    /// Asset file backing this effect
    pub fn file_name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot.wav",
            SoundEffect::Hit => "hit.wav",
            SoundEffect::Destroy => "destroy.wav",
            SoundEffect::BigBullet => "big_bullet.wav",
        }
    }
}

/// Fire-and-forget audio capability. Implementations must not block.
pub trait AudioSink: Send {
    fn play(&self, effect: SoundEffect);
    /// Start (or restart) the background music loop
    fn play_loop(&self);
    fn stop_loop(&self);
}

/// Audio backend errors
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("audio device unavailable: {0}")]
    Unavailable(String),
}

/// Something that can actually make noise. Runs on the audio worker thread.
pub trait SoundBackend: Send {
    fn play(&mut self, sound: &SoundHandle, volume: f32) -> Result<(), AudioError>;
    fn start_music(&mut self, track: &SoundHandle, volume: f32) -> Result<(), AudioError>;
    fn stop_music(&mut self) -> Result<(), AudioError>;
}

/// Rings the terminal bell for each effect; music is not supported
#[derive(Debug, Default)]
pub struct BellBackend;

impl SoundBackend for BellBackend {
    fn play(&mut self, _sound: &SoundHandle, volume: f32) -> Result<(), AudioError> {
        if volume > 0.0 {
            let mut out = io::stdout().lock();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }

    fn start_music(&mut self, _track: &SoundHandle, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullBackend;

impl SoundBackend for NullBackend {
    fn play(&mut self, _sound: &SoundHandle, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn start_music(&mut self, _track: &SoundHandle, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_music(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

enum AudioCommand {
    Play(SoundEffect, f32),
    StartMusic(f32),
    StopMusic,
    Shutdown,
}

/// Audio manager for the game
pub struct AudioManager {
    tx: Option<Sender<AudioCommand>>,
    worker: Option<JoinHandle<()>>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl AudioManager {
    /// Start the audio worker. If the thread cannot be spawned audio is
    /// disabled and every request becomes a no-op.
    pub fn new(bank: SoundBank, backend: Box<dyn SoundBackend>, settings: &Settings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCommand>();

        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || run_worker(bank, backend, rx));

        let (tx, worker) = match spawned {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(e) => {
                log::warn!("Failed to start audio thread - audio disabled: {e}");
                (None, None)
            }
        };

        let mut manager = Self {
            tx,
            worker,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        };
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_music_volume(settings.music_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if let Some(tx) = &self.tx {
            if tx.send(cmd).is_err() {
                log::debug!("Audio worker gone, request dropped");
            }
        }
    }
}

impl AudioSink for AudioManager {
    fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        self.send(AudioCommand::Play(effect, vol));
    }

    fn play_loop(&self) {
        let vol = self.effective_volume(self.music_volume);
        if vol <= 0.0 {
            return;
        }
        self.send(AudioCommand::StartMusic(vol));
    }

    fn stop_loop(&self) {
        self.send(AudioCommand::StopMusic);
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        self.send(AudioCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Audio thread panicked");
            }
        }
    }
}

fn run_worker(bank: SoundBank, mut backend: Box<dyn SoundBackend>, rx: mpsc::Receiver<AudioCommand>) {
    let mut music_playing = false;
    for cmd in rx {
        let result = match cmd {
            AudioCommand::Play(effect, vol) => match bank.get(effect) {
                Some(sound) => backend.play(sound, vol),
                None => Ok(()),
            },
            AudioCommand::StartMusic(vol) => match bank.music() {
                Some(track) => {
                    if music_playing {
                        let _ = backend.stop_music();
                    }
                    music_playing = true;
                    backend.start_music(track, vol)
                }
                None => Ok(()),
            },
            AudioCommand::StopMusic => {
                music_playing = false;
                backend.stop_music()
            }
            AudioCommand::Shutdown => break,
        };
        if let Err(e) = result {
            log::warn!("Error playing sound: {e}");
        }
    }
    if music_playing {
        let _ = backend.stop_music();
    }
}

/// One request seen by a [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Effect(SoundEffect),
    LoopStart,
    LoopStop,
}

/// Sink that only records what was asked of it
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<AudioCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: AudioCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl AudioSink for RecordingSink {
    fn play(&self, effect: SoundEffect) {
        self.record(AudioCall::Effect(effect));
    }

    fn play_loop(&self) {
        self.record(AudioCall::LoopStart);
    }

    fn stop_loop(&self) {
        self.record(AudioCall::LoopStop);
    }
}

impl<S: AudioSink + Sync> AudioSink for std::sync::Arc<S> {
    fn play(&self, effect: SoundEffect) {
        (**self).play(effect);
    }

    fn play_loop(&self) {
        (**self).play_loop();
    }

    fn stop_loop(&self) {
        (**self).stop_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Backend that reports everything it plays over a channel
    struct ProbeBackend {
        tx: Sender<String>,
        fail: bool,
    }

    impl SoundBackend for ProbeBackend {
        fn play(&mut self, sound: &SoundHandle, _volume: f32) -> Result<(), AudioError> {
            let _ = self.tx.send(sound.name.clone());
            if self.fail {
                return Err(AudioError::Unavailable("probe".into()));
            }
            Ok(())
        }

        fn start_music(&mut self, track: &SoundHandle, _volume: f32) -> Result<(), AudioError> {
            let _ = self.tx.send(format!("start {}", track.name));
            Ok(())
        }

        fn stop_music(&mut self) -> Result<(), AudioError> {
            let _ = self.tx.send("stop".into());
            Ok(())
        }
    }

    #[test]
    fn test_manager_forwards_to_backend() {
        let (tx, rx) = mpsc::channel();
        let manager = AudioManager::new(
            SoundBank::all_present(),
            Box::new(ProbeBackend { tx, fail: false }),
            &Settings::default(),
        );
        manager.play(SoundEffect::Destroy);
        manager.play_loop();
        manager.stop_loop();
        drop(manager);

        let seen: Vec<String> = rx.iter().collect();
        assert_eq!(seen, vec!["destroy.wav", "start music.wav", "stop"]);
    }

    #[test]
    fn test_backend_failure_is_swallowed() {
        let (tx, rx) = mpsc::channel();
        let manager = AudioManager::new(
            SoundBank::all_present(),
            Box::new(ProbeBackend { tx, fail: true }),
            &Settings::default(),
        );
        manager.play(SoundEffect::Shoot);
        manager.play(SoundEffect::Hit);
        drop(manager);
        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn test_missing_sound_is_silent() {
        let (tx, rx) = mpsc::channel();
        let manager = AudioManager::new(
            SoundBank::default(),
            Box::new(ProbeBackend { tx, fail: false }),
            &Settings::default(),
        );
        manager.play(SoundEffect::Shoot);
        drop(manager);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn test_muted_sends_nothing() {
        let (tx, rx) = mpsc::channel();
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let manager = AudioManager::new(
            SoundBank::all_present(),
            Box::new(ProbeBackend { tx, fail: false }),
            &settings,
        );
        manager.play(SoundEffect::Shoot);
        manager.play_loop();
        drop(manager);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn test_recording_sink() {
        let sink = Arc::new(RecordingSink::new());
        sink.play(SoundEffect::Hit);
        sink.play_loop();
        assert_eq!(sink.calls(), vec![AudioCall::Effect(SoundEffect::Hit), AudioCall::LoopStart]);
    }
}
