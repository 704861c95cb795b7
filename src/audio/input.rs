use super::{rms, AudioData, CaptureConfig};
use crate::speech::SpeechCapture;
use crate::{Result, ScholarError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Longest wait for one buffer once a phrase has started
const CHUNK_WAIT: Duration = Duration::from_secs(1);

/// Default-device microphone that records a single phrase per call
///
/// The cpal stream is opened inside `capture_audio` and dropped on return,
/// so the device is only held while a session is listening.
#[derive(Clone, Debug, Default)]
pub struct MicrophoneCapture {
    config: CaptureConfig,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Check that a default input device exists
    pub fn probe() -> Result<String> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| ScholarError::AudioDeviceError("No input device available".into()))?;
        Ok(device.name().unwrap_or_else(|_| "Unknown".to_string()))
    }
}

impl SpeechCapture for MicrophoneCapture {
    fn capture_audio(&self, timeout: Duration) -> Result<AudioData> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| ScholarError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config: cpal::StreamConfig = device
            .default_input_config()
            .map_err(|e| {
                ScholarError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        let (audio_tx, audio_rx) = bounded::<Vec<f32>>(256);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Failed to send audio data: {}", e);
                    }
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| {
                ScholarError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            ScholarError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        let deadline = Instant::now() + timeout;
        let mut recorder = PhraseRecorder::new(self.config.clone(), sample_rate);

        loop {
            let wait = if recorder.started() {
                CHUNK_WAIT
            } else {
                deadline.saturating_duration_since(Instant::now())
            };

            match audio_rx.recv_timeout(wait) {
                Ok(chunk) => {
                    if recorder.push(&chunk) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) if !recorder.started() => {
                    return Err(ScholarError::CaptureTimeout {
                        seconds: timeout.as_secs(),
                    });
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(ScholarError::AudioDeviceError(
                        "Input stream stopped delivering audio".into(),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ScholarError::AudioDeviceError("Input stream closed".into()));
                }
            }
        }

        drop(stream);
        let audio = recorder.finish();
        info!("Captured {:.2}s phrase", audio.duration_seconds());
        Ok(audio)
    }
}

/// Energy-gated phrase segmentation over mono buffers
#[derive(Debug)]
struct PhraseRecorder {
    config: CaptureConfig,
    sample_rate: u32,
    samples: Vec<f32>,
    started: bool,
    quiet_secs: f32,
}

impl PhraseRecorder {
    fn new(config: CaptureConfig, sample_rate: u32) -> Self {
        Self {
            config,
            sample_rate,
            samples: Vec::new(),
            started: false,
            quiet_secs: 0.0,
        }
    }

    fn started(&self) -> bool {
        self.started
    }

    fn recorded_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }

    /// Feed one buffer; returns true once the phrase is complete
    fn push(&mut self, chunk: &[f32]) -> bool {
        let loud = rms(chunk) >= self.config.energy_threshold;

        if !self.started {
            if !loud {
                return false;
            }
            debug!("Speech started");
            self.started = true;
        }

        self.samples.extend_from_slice(chunk);
        if loud {
            self.quiet_secs = 0.0;
        } else {
            self.quiet_secs += chunk.len() as f32 / self.sample_rate.max(1) as f32;
        }

        self.quiet_secs >= self.config.silence_secs
            || self.recorded_secs() >= self.config.max_phrase_secs
    }

    fn finish(self) -> AudioData {
        AudioData::new(self.samples, self.sample_rate, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> PhraseRecorder {
        PhraseRecorder::new(
            CaptureConfig {
                energy_threshold: 0.1,
                silence_secs: 0.5,
                max_phrase_secs: 2.0,
            },
            1000,
        )
    }

    #[test]
    fn test_quiet_input_never_starts() {
        let mut rec = recorder();
        for _ in 0..10 {
            assert!(!rec.push(&[0.01; 100]));
        }
        assert!(!rec.started());
        assert!(rec.finish().is_empty());
    }

    #[test]
    fn test_phrase_ends_after_silence() {
        let mut rec = recorder();
        assert!(!rec.push(&[0.0; 100]));
        assert!(!rec.push(&[0.5; 300]));
        assert!(rec.started());
        assert!(!rec.push(&[0.0; 250]));
        assert!(rec.push(&[0.0; 250]));

        let audio = rec.finish();
        assert_eq!(audio.samples.len(), 800);
        assert_eq!(audio.channels, 1);
    }

    #[test]
    fn test_speech_resets_silence() {
        let mut rec = recorder();
        rec.push(&[0.5; 100]);
        assert!(!rec.push(&[0.0; 400]));
        assert!(!rec.push(&[0.5; 100]));
        assert!(!rec.push(&[0.0; 400]));
    }

    #[test]
    fn test_long_phrase_is_cut() {
        let mut rec = recorder();
        for _ in 0..19 {
            assert!(!rec.push(&[0.5; 100]));
        }
        assert!(rec.push(&[0.5; 100]));
    }

    #[test]
    fn test_microphone_capture_if_available() {
        // Might not have an input device in CI
        if MicrophoneCapture::probe().is_ok() {
            let mic = MicrophoneCapture::default();
            let _ = mic.capture_audio(Duration::from_millis(50));
        }
    }
}
