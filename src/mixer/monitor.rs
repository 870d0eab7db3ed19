//! Desktop audio level monitor
//!
//! A dedicated thread owns the cpal stream (streams are not `Send`) and feeds
//! the mixer's analyser. A separate async loop samples the level at a fixed
//! interval and hands it to the caller.

use super::analyser::Analyser;
use super::{AudioMixer, MixerState};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SupportedStreamConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Loopback capture of whatever is playing
#[cfg(windows)]
fn capture_device() -> Option<(Device, SupportedStreamConfig)> {
    let device = cpal::default_host().default_output_device()?;
    let config = device.default_output_config().ok()?;
    Some((device, config))
}

#[cfg(not(windows))]
fn capture_device() -> Option<(Device, SupportedStreamConfig)> {
    let device = cpal::default_host().default_input_device()?;
    let config = device.default_input_config().ok()?;
    Some((device, config))
}

fn log_stream_error(err: cpal::StreamError) {
    tracing::error!("Audio level stream error: {}", err);
}

/// Downmix interleaved frames to mono and feed the analyser
fn push_interleaved<T: Copy>(
    analyser: &Mutex<Analyser>,
    data: &[T],
    channels: usize,
    to_f32: fn(T) -> f32,
) {
    let channels = channels.max(1);
    let mono: Vec<f32> = data
        .chunks(channels)
        .map(|frame| frame.iter().map(|&s| to_f32(s)).sum::<f32>() / frame.len() as f32)
        .collect();
    analyser.lock().push_samples(&mono);
}

fn run_capture(analyser: Arc<Mutex<Analyser>>, running: Arc<AtomicBool>) {
    let Some((device, supported)) = capture_device() else {
        tracing::warn!("No audio device available for level monitoring");
        return;
    };

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    let channels = supported.channels() as usize;
    let config = supported.config();

    let stream = match supported.sample_format() {
        SampleFormat::F32 => {
            let analyser = analyser.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_interleaved(&analyser, data, channels, |s| s)
                },
                log_stream_error,
                None,
            )
        }
        SampleFormat::I16 => {
            let analyser = analyser.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_interleaved(&analyser, data, channels, |s| s as f32 / i16::MAX as f32)
                },
                log_stream_error,
                None,
            )
        }
        other => {
            tracing::warn!("Unsupported sample format for level monitoring: {:?}", other);
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to open audio level stream: {}", e);
            return;
        }
    };

    if let Err(e) = stream.play() {
        tracing::warn!("Failed to start audio level stream: {}", e);
        return;
    }

    tracing::info!("Monitoring audio levels on {}", device_name);

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("Audio level monitoring stopped");
}

/// Owns the capture thread feeding the analyser
pub struct LevelMonitor {
    running: Arc<AtomicBool>,
    capture: Option<JoinHandle<()>>,
}

impl LevelMonitor {
    /// Start capturing; without a usable device the level simply stays at 0
    pub fn start(mixer: &AudioMixer) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let analyser = mixer.analyser();
        let flag = running.clone();
        let capture = std::thread::Builder::new()
            .name("audio-level".to_string())
            .spawn(move || run_capture(analyser, flag))
            .map_err(|e| tracing::error!("Failed to spawn audio level thread: {}", e))
            .ok();

        Self { running, capture }
    }

    /// Flag that stays `true` until the monitor stops
    pub fn running(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sample the mixer every `interval` until `running` clears
pub async fn tick_levels<F>(
    mixer: Arc<AudioMixer>,
    interval: Duration,
    running: Arc<AtomicBool>,
    on_level: F,
) where
    F: Fn(MixerState) + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    while running.load(Ordering::SeqCst) {
        ticker.tick().await;
        mixer.refresh_level();
        on_level(mixer.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::analyser::FFT_SIZE;

    #[test]
    fn test_push_interleaved_downmixes() {
        let analyser = Mutex::new(Analyser::new());
        let stereo: Vec<f32> = (0..FFT_SIZE * 2)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        push_interleaved(&analyser, &stereo, 2, |s| s);
        // Opposite channels cancel out
        assert!(analyser
            .lock()
            .byte_frequency_data()
            .iter()
            .all(|&b| b == 0));
    }

    #[tokio::test]
    async fn test_tick_levels_until_stopped() {
        let mixer = Arc::new(AudioMixer::new(70));
        let running = Arc::new(AtomicBool::new(true));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let flag = running.clone();
        let sink = seen.clone();
        tick_levels(mixer, Duration::from_millis(5), running, move |state| {
            let mut seen = sink.lock();
            seen.push(state);
            if seen.len() == 3 {
                flag.store(false, Ordering::SeqCst);
            }
        })
        .await;

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|s| s.level == 0.0 && s.volume == 70));
    }
}
