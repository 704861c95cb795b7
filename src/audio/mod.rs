//! Captured audio and microphone access
//!
//! `AudioData` is what the capture boundary hands to the transcriber. The
//! cpal-backed microphone and the resampler only exist with `audio-io`.

#[cfg(feature = "audio-io")]
pub mod input;
pub mod preprocessor;

#[cfg(feature = "audio-io")]
pub use input::MicrophoneCapture;

use serde::{Deserialize, Serialize};

/// Microphone listening parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// RMS level (0.0-1.0) that counts as speech
    pub energy_threshold: f32,
    /// Quiet time that ends a phrase
    pub silence_secs: f32,
    /// Longest phrase recorded before capture stops on its own
    pub max_phrase_secs: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.01,
            silence_secs: 0.8,
            max_phrase_secs: 10.0,
        }
    }
}

/// Mono or interleaved f32 samples with their format
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Root-mean-square amplitude of a block of samples
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
