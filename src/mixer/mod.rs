//! Audio mixer
//!
//! One "Desktop Audio" channel with a volume fader, a mute toggle and a
//! level meter. Volume and mute also set the gain of the recorded audio.

pub mod analyser;
pub mod meter;
pub mod monitor;

pub use analyser::Analyser;
pub use meter::{SegmentColor, DB_SCALE, SEGMENTS};
pub use monitor::{tick_levels, LevelMonitor};

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

pub const DEFAULT_VOLUME: u8 = 70;
pub const MAX_VOLUME: u8 = 100;

/// What the mixer panel renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerState {
    pub volume: u8,
    pub muted: bool,
    pub level: f32,
    pub segments: [SegmentColor; SEGMENTS],
    pub db_scale: [i32; 5],
}

pub struct AudioMixer {
    volume: AtomicU8,
    muted: AtomicBool,
    level: Mutex<f32>,
    analyser: Arc<Mutex<Analyser>>,
}

impl AudioMixer {
    pub fn new(volume: u8) -> Self {
        Self {
            volume: AtomicU8::new(volume.min(MAX_VOLUME)),
            muted: AtomicBool::new(false),
            level: Mutex::new(0.0),
            analyser: Arc::new(Mutex::new(Analyser::new())),
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::SeqCst)
    }

    /// Set the fader, clamped to 0-100
    pub fn set_volume(&self, volume: u8) -> u8 {
        let volume = volume.min(MAX_VOLUME);
        self.volume.store(volume, Ordering::SeqCst);
        volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
        if muted {
            *self.level.lock() = 0.0;
        }
    }

    pub fn toggle_mute(&self) -> bool {
        let muted = !self.is_muted();
        self.set_muted(muted);
        muted
    }

    /// Linear gain for the recorded audio track
    pub fn gain(&self) -> f32 {
        if self.is_muted() {
            0.0
        } else {
            self.volume() as f32 / MAX_VOLUME as f32
        }
    }

    pub fn level(&self) -> f32 {
        *self.level.lock()
    }

    pub fn analyser(&self) -> Arc<Mutex<Analyser>> {
        self.analyser.clone()
    }

    /// Re-read the analyser; muted always reads 0
    pub fn refresh_level(&self) -> f32 {
        let level = if self.is_muted() {
            0.0
        } else {
            let data = self.analyser.lock().byte_frequency_data();
            meter::average_level(&data)
        };
        *self.level.lock() = level;
        level
    }

    pub fn snapshot(&self) -> MixerState {
        let level = self.level();
        MixerState {
            volume: self.volume(),
            muted: self.is_muted(),
            level,
            segments: meter::segments(level),
            db_scale: DB_SCALE,
        }
    }
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
