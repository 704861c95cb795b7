//! Listening session state

use std::time::Instant;
use uuid::Uuid;

/// Why a listening session failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// Nothing intelligible was heard, or no speech started before the timeout
    NoSpeechDetected,
    /// The transcription service could not be reached or failed
    ServiceUnavailable,
    /// The capture device could not be opened or read
    MicrophoneUnavailable,
}

impl FailureReason {
    /// Status line shown to the user; distinct per reason
    pub fn status_message(&self) -> &'static str {
        match self {
            FailureReason::NoSpeechDetected => "⚠️ Couldn't understand.",
            FailureReason::ServiceUnavailable => "🚫 Speech service unavailable.",
            FailureReason::MicrophoneUnavailable => "🎤 Microphone unavailable.",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoSpeechDetected => write!(f, "NoSpeechDetected"),
            FailureReason::ServiceUnavailable => write!(f, "ServiceUnavailable"),
            FailureReason::MicrophoneUnavailable => write!(f, "MicrophoneUnavailable"),
        }
    }
}

/// Listening lifecycle
///
/// `Idle -> Listening -> Processing -> {Done, Failed}`; `Done`/`Failed`
/// return to `Idle` once the result has been taken. `stop()` returns to
/// `Idle` from anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListeningState {
    #[default]
    Idle,
    /// Capturing audio
    Listening,
    /// Audio captured, transcription running
    Processing,
    /// Transcript ready for the query session
    Done(String),
    Failed(FailureReason),
}

impl ListeningState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ListeningState::Idle)
    }

    /// Capture or transcription still in flight
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ListeningState::Listening | ListeningState::Processing)
    }

    /// Done or Failed, waiting for the result to be taken
    pub fn is_terminal(&self) -> bool {
        matches!(self, ListeningState::Done(_) | ListeningState::Failed(_))
    }

    /// Status line for this state
    pub fn status_message(&self) -> &'static str {
        match self {
            ListeningState::Idle | ListeningState::Done(_) => "✅ Ready",
            ListeningState::Listening => "🎙️ Listening...",
            ListeningState::Processing => "⏳ Processing...",
            ListeningState::Failed(reason) => reason.status_message(),
        }
    }
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "Idle"),
            ListeningState::Listening => write!(f, "Listening"),
            ListeningState::Processing => write!(f, "Processing"),
            ListeningState::Done(_) => write!(f, "Done"),
            ListeningState::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Result of a finished session, handed to the caller exactly once
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListeningOutcome {
    Transcript(String),
    Failed(FailureReason),
}

/// The single active listening session
#[derive(Clone, Debug)]
pub struct ListeningSession {
    /// Tags capture messages so late results from older sessions are recognised
    pub id: Uuid,
    pub state: ListeningState,
    pub started_at: Instant,
}

impl ListeningSession {
    pub fn new(started_at: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ListeningState::Listening,
            started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(ListeningState::Idle.is_idle());
        assert!(ListeningState::Listening.is_in_flight());
        assert!(ListeningState::Processing.is_in_flight());
        assert!(ListeningState::Done("hi".into()).is_terminal());
        assert!(ListeningState::Failed(FailureReason::NoSpeechDetected).is_terminal());
        assert!(!ListeningState::Idle.is_in_flight());
    }

    #[test]
    fn test_failure_messages_are_distinct() {
        let messages = [
            FailureReason::NoSpeechDetected.status_message(),
            FailureReason::ServiceUnavailable.status_message(),
            FailureReason::MicrophoneUnavailable.status_message(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn test_display() {
        assert_eq!(ListeningState::Listening.to_string(), "Listening");
        assert_eq!(
            ListeningState::Failed(FailureReason::ServiceUnavailable).to_string(),
            "Failed(ServiceUnavailable)"
        );
    }

    #[test]
    fn test_new_session_is_listening() {
        let a = ListeningSession::new(Instant::now());
        let b = ListeningSession::new(Instant::now());
        assert_eq!(a.state, ListeningState::Listening);
        assert_ne!(a.id, b.id);
    }
}
