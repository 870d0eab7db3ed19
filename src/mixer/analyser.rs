//! Frequency analyser
//!
//! Produces byte frequency data from raw samples: a Blackman-windowed FFT
//! over the most recent block, smoothed over time and mapped from a dB
//! range onto 0-255.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

pub const FFT_SIZE: usize = 256;
pub const SMOOTHING: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

fn blackman_window(size: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..size)
        .map(|n| {
            let x = n as f32 / size as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: VecDeque<f32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(FFT_SIZE),
            window: blackman_window(FFT_SIZE),
            samples: std::iter::repeat(0.0).take(FFT_SIZE).collect(),
            smoothed: vec![0.0; FFT_SIZE / 2],
        }
    }

    /// Number of values returned by `byte_frequency_data`
    pub fn bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    /// Feed mono samples in -1.0..=1.0; only the last block is kept
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            if self.samples.len() == FFT_SIZE {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
    }

    /// Analyse the current block and return one byte per frequency bin
    pub fn byte_frequency_data(&mut self) -> Vec<u8> {
        let mut buffer: Vec<Complex<f32>> = self
            .samples
            .iter()
            .zip(&self.window)
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let range = MAX_DECIBELS - MIN_DECIBELS;
        self.smoothed
            .iter_mut()
            .zip(&buffer)
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() / FFT_SIZE as f32;
                *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;

                let db = 20.0 * smoothed.log10();
                let scaled = 255.0 * (db - MIN_DECIBELS) / range;
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::meter::average_level;

    fn sine(freq_bin: usize, amplitude: f32) -> Vec<f32> {
        (0..FFT_SIZE)
            .map(|n| amplitude * (2.0 * PI * freq_bin as f32 * n as f32 / FFT_SIZE as f32).sin())
            .collect()
    }

    #[test]
    fn test_window_shape() {
        let window = blackman_window(FFT_SIZE);
        assert!(window[0].abs() < 1e-6);
        assert!((window[FFT_SIZE / 2] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_silence_reads_zero() {
        let mut analyser = Analyser::new();
        analyser.push_samples(&[0.0; FFT_SIZE]);
        let data = analyser.byte_frequency_data();
        assert_eq!(data.len(), analyser.bin_count());
        assert!(data.iter().all(|&b| b == 0));
        assert_eq!(average_level(&data), 0.0);
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = Analyser::new();
        let tone = sine(16, 0.8);
        for _ in 0..20 {
            analyser.push_samples(&tone);
            analyser.byte_frequency_data();
        }
        let data = analyser.byte_frequency_data();
        assert_eq!(data[16], 255);
        assert!(data.iter().all(|&v| v <= data[16]));
        assert_eq!(data[40], 0);
    }

    #[test]
    fn test_smoothing_decays() {
        let mut analyser = Analyser::new();
        analyser.push_samples(&sine(16, 0.8));
        let loud = analyser.byte_frequency_data()[16];

        analyser.push_samples(&[0.0; FFT_SIZE]);
        let decaying = analyser.byte_frequency_data()[16];
        assert!(decaying > 0);
        assert!(decaying <= loud);
    }
}
