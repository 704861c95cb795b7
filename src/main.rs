//! Scholar - school question answering assistant
//!
//! Main entry point: logging, configuration, speech backends, window.

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use scholar::speech::{NoMicrophone, SpeechCapture, Transcriber, UnavailableTranscriber};
use scholar::ui::{ScholarApp, WINDOW_TITLE};
use scholar::{Assistant, AssistantConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "audio-io")]
fn speech_backends(config: &AssistantConfig) -> (Arc<dyn SpeechCapture>, Arc<dyn Transcriber>) {
    use scholar::audio::MicrophoneCapture;
    use scholar::speech::WhisperTranscriber;

    let capture: Arc<dyn SpeechCapture> = match MicrophoneCapture::probe() {
        Ok(device) => {
            info!("Microphone: {}", device);
            Arc::new(MicrophoneCapture::new(config.capture.clone()))
        }
        Err(e) => {
            warn!("Voice input disabled: {}", e);
            Arc::new(NoMicrophone::new(e.to_string()))
        }
    };

    let transcriber: Arc<dyn Transcriber> = match WhisperTranscriber::new(config.stt.clone()) {
        Ok(whisper) => Arc::new(whisper),
        Err(e) => {
            warn!("Transcription disabled: {}", e);
            Arc::new(UnavailableTranscriber::new(e.to_string()))
        }
    };

    (capture, transcriber)
}

#[cfg(not(feature = "audio-io"))]
fn speech_backends(_config: &AssistantConfig) -> (Arc<dyn SpeechCapture>, Arc<dyn Transcriber>) {
    warn!("Built without the audio-io feature, voice input disabled");
    (
        Arc::new(NoMicrophone::new("built without audio-io")),
        Arc::new(UnavailableTranscriber::new("built without audio-io")),
    )
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholar=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scholar assistant");

    let config = AssistantConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let (capture, transcriber) = speech_backends(&config);
    let assistant = Assistant::from_config(&config, capture, transcriber)
        .context("Failed to set up the assistant")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([600.0, 500.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(ScholarApp::new(cc, assistant)))),
    )
    .map_err(|e| anyhow!("GUI failed: {}", e))
}
