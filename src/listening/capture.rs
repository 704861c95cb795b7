//! Capture worker
//!
//! Records one utterance and transcribes it on a dedicated thread. The worker
//! never touches session state: it only reports back over a channel, tagging
//! every message with the session it was started for.

use super::FailureReason;
use crate::speech::{SpeechCapture, Transcriber};
use crate::ScholarError;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Messages from a capture worker to the session owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureMessage {
    /// Audio recorded, transcription starting
    Captured { session: Uuid },
    /// Final result of the session
    Finished {
        session: Uuid,
        result: Result<String, FailureReason>,
    },
}

impl CaptureMessage {
    pub fn session(&self) -> Uuid {
        match self {
            CaptureMessage::Captured { session } | CaptureMessage::Finished { session, .. } => {
                *session
            }
        }
    }
}

/// Map a capture-side error to the reason shown to the user
pub fn capture_failure(error: &ScholarError) -> FailureReason {
    match error {
        ScholarError::CaptureTimeout { .. } | ScholarError::NoSpeechDetected => {
            FailureReason::NoSpeechDetected
        }
        ScholarError::AudioDeviceError(_) => FailureReason::MicrophoneUnavailable,
        _ => FailureReason::ServiceUnavailable,
    }
}

/// Map a transcription error to the reason shown to the user
pub fn transcription_failure(error: &ScholarError) -> FailureReason {
    match error {
        ScholarError::NoSpeechDetected => FailureReason::NoSpeechDetected,
        _ => FailureReason::ServiceUnavailable,
    }
}

/// One capture-then-transcribe run for a single session
pub struct CaptureWorker {
    pub session: Uuid,
    pub capture: Arc<dyn SpeechCapture>,
    pub transcriber: Arc<dyn Transcriber>,
    pub timeout: Duration,
    /// Set by the owner on stop; checked between steps
    pub cancelled: Arc<AtomicBool>,
    pub tx: Sender<CaptureMessage>,
}

impl CaptureWorker {
    /// Start the worker thread
    pub fn start(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("capture-{}", self.session))
            .spawn(move || self.run())
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn send(&self, msg: CaptureMessage) {
        // Owner gone means nobody is waiting for this session
        if self.tx.send(msg).is_err() {
            debug!("Session {} owner dropped, discarding result", self.session);
        }
    }

    fn run(self) {
        info!("Capture worker started for session {}", self.session);

        let audio = match self.capture.capture_audio(self.timeout) {
            Ok(audio) => audio,
            Err(e) => {
                if self.is_cancelled() {
                    debug!("Session {} cancelled during capture", self.session);
                    return;
                }
                warn!("Capture failed: {}", e);
                self.send(CaptureMessage::Finished {
                    session: self.session,
                    result: Err(capture_failure(&e)),
                });
                return;
            }
        };

        if self.is_cancelled() {
            debug!("Session {} cancelled after capture", self.session);
            return;
        }
        self.send(CaptureMessage::Captured {
            session: self.session,
        });

        let result = match self.transcriber.transcribe(&audio) {
            Ok(text) => {
                let text = text.trim().to_lowercase();
                if text.is_empty() {
                    Err(FailureReason::NoSpeechDetected)
                } else {
                    Ok(text)
                }
            }
            Err(e) => {
                warn!("Transcription failed: {}", e);
                Err(transcription_failure(&e))
            }
        };

        if self.is_cancelled() {
            debug!("Session {} cancelled during transcription", self.session);
            return;
        }

        info!("Capture worker finished for session {}", self.session);
        self.send(CaptureMessage::Finished {
            session: self.session,
            result,
        });
    }
}
