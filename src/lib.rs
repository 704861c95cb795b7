//! Scholar - a school query answering assistant
//!
//! Questions arrive as typed text or as a transcript from a listening session,
//! are fuzzily matched against a small curated knowledge base, and resolve to
//! a spoken/displayed answer or to an offer to search the web instead.

pub mod audio;
pub mod integration;
pub mod knowledge;
pub mod listening;
pub mod query;
pub mod speech;
#[cfg(feature = "gui")]
pub mod ui;

use thiserror::Error;

pub use integration::{Assistant, AssistantConfig, Presenter};
pub use knowledge::{KnowledgeBase, ProducerRegistry, Responder};
pub use listening::{FailureReason, ListeningController, ListeningState};
pub use query::{AnswerResolver, FuzzyMatcher, MatchResult, QueryOutcome, QuerySession};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScholarError {
    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("No speech started within {seconds}s")]
    CaptureTimeout { seconds: u64 },

    #[error("No speech detected")]
    NoSpeechDetected,

    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Cannot {action} while {state}")]
    InvalidStateTransition { action: &'static str, state: String },

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Knowledge error: {0}")]
    KnowledgeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Search error: {0}")]
    SearchError(String),
}

impl From<std::io::Error> for ScholarError {
    fn from(e: std::io::Error) -> Self {
        ScholarError::IOError(e.to_string())
    }
}

impl ScholarError {
    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ScholarError::ResolutionError(_) => {
                integration::ANSWER_FAILED.to_string()
            }
            ScholarError::CaptureTimeout { .. } | ScholarError::NoSpeechDetected => {
                "Couldn't understand.".to_string()
            }
            ScholarError::ServiceUnavailable(_) => "Speech service unavailable.".to_string(),
            ScholarError::InvalidStateTransition { .. } => {
                "Already listening. Please wait.".to_string()
            }
            ScholarError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone.".to_string()
            }
            ScholarError::ModelLoadError(_) => {
                "Failed to load the speech model. Please verify model files are present."
                    .to_string()
            }
            ScholarError::KnowledgeError(_) => {
                "The knowledge file could not be loaded.".to_string()
            }
            ScholarError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
            ScholarError::IOError(_) => "File system error occurred.".to_string(),
            ScholarError::SearchError(_) => "Could not open the web browser.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScholarError>;
