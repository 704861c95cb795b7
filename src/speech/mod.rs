//! Speech boundaries
//!
//! The core only depends on these traits:
//! - `SpeechCapture`: record one utterance, with a listen timeout
//! - `Transcriber`: turn recorded audio into text
//! - `Speaker`: say an answer out loud, fire-and-forget
//!
//! Concrete engines live next to them: Whisper (`audio-io` feature), a
//! system TTS command, and stand-ins used when no device or model exists.

#[cfg(feature = "audio-io")]
pub mod stt;
pub mod tts;

use crate::audio::AudioData;
use crate::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "audio-io")]
pub use stt::WhisperTranscriber;
pub use tts::{CommandSpeaker, LogSpeaker, SpeechConfig};

/// Configuration for the Whisper speech-to-text engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,

    /// Language to transcribe (None for auto-detection)
    pub language: Option<String>,

    /// Number of threads to use for transcription
    pub n_threads: i32,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            language: Some("en".to_string()),
            n_threads: 4,
        }
    }
}

/// Records one utterance
pub trait SpeechCapture: Send + Sync {
    /// Block until an utterance has been recorded
    ///
    /// Returns `CaptureTimeout` when no speech starts within `timeout`.
    fn capture_audio(&self, timeout: Duration) -> Result<AudioData>;
}

/// Converts recorded audio to text
pub trait Transcriber: Send + Sync {
    /// Returns `NoSpeechDetected` when nothing intelligible was said and
    /// `ServiceUnavailable` when the engine cannot be used.
    fn transcribe(&self, audio: &AudioData) -> Result<String>;
}

/// Speaks text; must return without waiting for playback
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str);
}

/// Capture stand-in for machines without a usable microphone
#[derive(Debug, Default)]
pub struct NoMicrophone {
    reason: String,
}

impl NoMicrophone {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SpeechCapture for NoMicrophone {
    fn capture_audio(&self, _timeout: Duration) -> Result<AudioData> {
        Err(ScholarError::AudioDeviceError(self.reason.clone()))
    }
}

/// Transcriber stand-in used when no speech model could be loaded
#[derive(Debug, Default)]
pub struct UnavailableTranscriber {
    reason: String,
}

impl UnavailableTranscriber {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Transcriber for UnavailableTranscriber {
    fn transcribe(&self, _audio: &AudioData) -> Result<String> {
        Err(ScholarError::ServiceUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stand_ins_fail_with_their_reason() {
        let capture = NoMicrophone::new("no input device");
        assert_eq!(
            capture.capture_audio(Duration::from_secs(1)),
            Err(ScholarError::AudioDeviceError("no input device".into()))
        );

        let transcriber = UnavailableTranscriber::new("model missing");
        let audio = AudioData::new(vec![0.0; 10], 16000, 1);
        assert_eq!(
            transcriber.transcribe(&audio),
            Err(ScholarError::ServiceUnavailable("model missing".into()))
        );
    }
}
