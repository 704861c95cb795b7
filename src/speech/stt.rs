//! Whisper speech-to-text

use super::{Transcriber, WhisperConfig};
use crate::audio::preprocessor::prepare_for_whisper;
use crate::audio::AudioData;
use crate::{Result, ScholarError};
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Markers Whisper emits for audio without words
const NON_SPEECH_MARKERS: &[&str] = &["[BLANK_AUDIO]", "[SILENCE]", "(silence)", "[NO SPEECH]"];

pub struct WhisperTranscriber {
    config: WhisperConfig,
    context: WhisperContext,
}

impl WhisperTranscriber {
    /// Load the Whisper model
    pub fn new(config: WhisperConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(ScholarError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let model_path = config
            .model_path
            .to_str()
            .ok_or_else(|| ScholarError::ModelLoadError("Invalid model path".to_string()))?;

        let context =
            WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                .map_err(|e| {
                    ScholarError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e))
                })?;

        info!("Whisper model loaded successfully");
        Ok(Self { config, context })
    }

    fn run(&self, samples: &[f32]) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.config.n_threads);
        params.set_translate(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        if let Some(ref lang) = self.config.language {
            params.set_language(Some(lang.as_str()));
        }

        let mut state = self.context.create_state().map_err(|e| {
            ScholarError::ServiceUnavailable(format!("Failed to create state: {:?}", e))
        })?;

        state.full(params, samples).map_err(|e| {
            ScholarError::ServiceUnavailable(format!("Transcription failed: {:?}", e))
        })?;

        let num_segments = state.full_n_segments().map_err(|e| {
            ScholarError::ServiceUnavailable(format!("Failed to get segments: {:?}", e))
        })?;

        let mut text = String::new();
        for i in 0..num_segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                ScholarError::ServiceUnavailable(format!("Failed to get segment text: {:?}", e))
            })?;
            text.push_str(&segment);
        }
        Ok(text)
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &AudioData) -> Result<String> {
        if audio.is_empty() {
            return Err(ScholarError::NoSpeechDetected);
        }

        let samples = prepare_for_whisper(audio)?;
        debug!(
            "Transcribing {} samples ({:.2}s)",
            samples.len(),
            audio.duration_seconds()
        );

        let text = strip_non_speech(&self.run(&samples)?);
        if text.is_empty() {
            return Err(ScholarError::NoSpeechDetected);
        }

        debug!("Transcription result: '{}'", text);
        Ok(text)
    }
}

/// Remove Whisper's non-speech markers and surrounding whitespace
fn strip_non_speech(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in NON_SPEECH_MARKERS {
        text = text.replace(marker, " ");
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
