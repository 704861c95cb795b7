//! Listening controller
//!
//! Owns the single listening session. All state writes happen here, on the
//! caller's loop; capture workers only report back through a channel and
//! anything they send for a session that is no longer in flight is dropped.

use super::capture::{CaptureMessage, CaptureWorker};
use super::feedback::{FeedbackConfig, FeedbackLoop, WaveFrame};
use super::state::{ListeningOutcome, ListeningSession, ListeningState};
use crate::speech::{SpeechCapture, Transcriber};
use crate::{Result, ScholarError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Listening configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListeningConfig {
    /// How long to wait for speech to start
    pub listen_timeout_secs: u64,
    pub feedback: FeedbackConfig,
}

impl Default for ListeningConfig {
    fn default() -> Self {
        Self {
            listen_timeout_secs: 5,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl ListeningConfig {
    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }
}

/// What changed during a `poll`
#[derive(Clone, Debug, PartialEq)]
pub enum ListeningEvent {
    State(ListeningState),
    Frame(WaveFrame),
}

pub struct ListeningController {
    capture: Arc<dyn SpeechCapture>,
    transcriber: Arc<dyn Transcriber>,
    config: ListeningConfig,
    session: Option<ListeningSession>,
    cancel: Option<Arc<AtomicBool>>,
    feedback: FeedbackLoop,
    msg_tx: Sender<CaptureMessage>,
    msg_rx: Receiver<CaptureMessage>,
    stale_messages: u64,
}

impl ListeningController {
    pub fn new(
        capture: Arc<dyn SpeechCapture>,
        transcriber: Arc<dyn Transcriber>,
        config: ListeningConfig,
    ) -> Self {
        let (msg_tx, msg_rx) = unbounded();
        let feedback = FeedbackLoop::new(config.feedback.clone());

        Self {
            capture,
            transcriber,
            config,
            session: None,
            cancel: None,
            feedback,
            msg_tx,
            msg_rx,
            stale_messages: 0,
        }
    }

    /// Current state; `Idle` when no session exists
    pub fn state(&self) -> ListeningState {
        self.session
            .as_ref()
            .map(|s| s.state.clone())
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&ListeningSession> {
        self.session.as_ref()
    }

    /// Begin a session: start the feedback loop and the capture worker
    ///
    /// Only valid from `Idle`; otherwise fails with `InvalidStateTransition`
    /// and leaves the current session untouched.
    pub fn start(&mut self, now: Instant) -> Result<Uuid> {
        let state = self.state();
        if !state.is_idle() {
            warn!("Ignoring start while {}", state);
            return Err(ScholarError::InvalidStateTransition {
                action: "start listening",
                state: state.to_string(),
            });
        }

        let session = ListeningSession::new(now);
        let id = session.id;
        let cancelled = Arc::new(AtomicBool::new(false));

        let worker = CaptureWorker {
            session: id,
            capture: Arc::clone(&self.capture),
            transcriber: Arc::clone(&self.transcriber),
            timeout: self.config.listen_timeout(),
            cancelled: Arc::clone(&cancelled),
            tx: self.msg_tx.clone(),
        };

        worker.start().map_err(|e| {
            ScholarError::ServiceUnavailable(format!("Failed to spawn capture worker: {}", e))
        })?;

        self.session = Some(session);
        self.cancel = Some(cancelled);
        self.feedback.begin(now);

        info!("Listening session {} started", id);
        Ok(id)
    }

    /// Return to `Idle` from any state
    ///
    /// Terminates the feedback loop and flags the in-flight worker; whatever
    /// it still sends afterwards is discarded by `poll`.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
        self.feedback.terminate();

        if let Some(session) = self.session.take() {
            info!("Listening session {} stopped while {}", session.id, session.state);
        }
    }

    /// Apply worker messages and tick the feedback loop
    pub fn poll(&mut self, now: Instant) -> Vec<ListeningEvent> {
        let mut events = Vec::new();

        // the due frame belongs to the state before these messages
        if let Some(frame) = self.feedback.tick(now) {
            events.push(ListeningEvent::Frame(frame));
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(state) = self.apply(msg) {
                events.push(ListeningEvent::State(state));
            }
        }

        events
    }

    fn apply(&mut self, msg: CaptureMessage) -> Option<ListeningState> {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id == msg.session() && s.state.is_in_flight())
        else {
            self.stale_messages += 1;
            debug!("Discarding stale message for session {}", msg.session());
            return None;
        };

        let next = match msg {
            CaptureMessage::Captured { .. } if session.state == ListeningState::Listening => {
                ListeningState::Processing
            }
            CaptureMessage::Captured { .. } => {
                self.stale_messages += 1;
                return None;
            }
            CaptureMessage::Finished { result: Ok(text), .. } => ListeningState::Done(text),
            CaptureMessage::Finished {
                result: Err(reason),
                ..
            } => ListeningState::Failed(reason),
        };

        debug!("Session {}: {} -> {}", session.id, session.state, next);
        session.state = next.clone();

        if next.is_terminal() {
            self.cancel = None;
            self.feedback.terminate();
        }
        Some(next)
    }

    /// Hand over the result of a finished session and return to `Idle`
    pub fn take_outcome(&mut self) -> Option<ListeningOutcome> {
        let outcome = match &self.session.as_ref()?.state {
            ListeningState::Done(text) => ListeningOutcome::Transcript(text.clone()),
            ListeningState::Failed(reason) => ListeningOutcome::Failed(*reason),
            _ => return None,
        };
        self.session = None;
        Some(outcome)
    }

    /// When `poll` next has work to do, ignoring worker messages
    pub fn next_deadline(&self) -> Option<Instant> {
        self.feedback.next_deadline()
    }

    pub fn is_feedback_active(&self) -> bool {
        self.feedback.is_active()
    }

    /// How many times an active feedback loop has been terminated
    pub fn feedback_terminations(&self) -> u64 {
        self.feedback.terminations()
    }

    pub fn stale_messages_discarded(&self) -> u64 {
        self.stale_messages
    }
}

impl Drop for ListeningController {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioData;
    use crate::listening::FailureReason;
    use crossbeam_channel::bounded;
    use std::thread;

    /// Capture that blocks until the test releases it
    struct GatedCapture {
        gate: Receiver<()>,
    }

    impl SpeechCapture for GatedCapture {
        fn capture_audio(&self, _timeout: Duration) -> Result<AudioData> {
            let _ = self.gate.recv();
            Ok(AudioData::new(vec![0.3; 160], 16000, 1))
        }
    }

    struct EchoTranscriber(Result<String>);

    impl Transcriber for EchoTranscriber {
        fn transcribe(&self, _audio: &AudioData) -> Result<String> {
            self.0.clone()
        }
    }

    fn controller(transcript: Result<String>) -> (ListeningController, Sender<()>) {
        let (gate_tx, gate_rx) = bounded(1);
        let controller = ListeningController::new(
            Arc::new(GatedCapture { gate: gate_rx }),
            Arc::new(EchoTranscriber(transcript)),
            ListeningConfig::default(),
        );
        (controller, gate_tx)
    }

    fn poll_until_terminal(controller: &mut ListeningController) -> ListeningState {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            controller.poll(Instant::now());
            let state = controller.state();
            if state.is_terminal() {
                return state;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("session never finished");
    }

    #[test]
    fn test_start_moves_to_listening() {
        let (mut controller, _gate) = controller(Ok("hi".into()));
        assert_eq!(controller.state(), ListeningState::Idle);

        let id = controller.start(Instant::now()).unwrap();
        assert_eq!(controller.state(), ListeningState::Listening);
        assert_eq!(controller.session().map(|s| s.id), Some(id));
        assert!(controller.is_feedback_active());
        controller.stop();
    }

    #[test]
    fn test_double_start_rejected() {
        let (mut controller, _gate) = controller(Ok("hi".into()));
        let id = controller.start(Instant::now()).unwrap();

        let err = controller.start(Instant::now()).unwrap_err();
        assert!(matches!(err, ScholarError::InvalidStateTransition { .. }));
        assert_eq!(controller.state(), ListeningState::Listening);
        assert_eq!(controller.session().map(|s| s.id), Some(id));
        controller.stop();
    }

    #[test]
    fn test_successful_session() {
        let (mut controller, gate) = controller(Ok("Who Created You".into()));
        controller.start(Instant::now()).unwrap();
        gate.send(()).unwrap();

        assert_eq!(
            poll_until_terminal(&mut controller),
            ListeningState::Done("who created you".into())
        );
        assert!(!controller.is_feedback_active());
        assert_eq!(controller.feedback_terminations(), 1);

        assert_eq!(
            controller.take_outcome(),
            Some(ListeningOutcome::Transcript("who created you".into()))
        );
        assert_eq!(controller.state(), ListeningState::Idle);
        assert_eq!(controller.take_outcome(), None);
    }

    #[test]
    fn test_failed_session() {
        let (mut controller, gate) = controller(Err(ScholarError::NoSpeechDetected));
        controller.start(Instant::now()).unwrap();
        gate.send(()).unwrap();

        assert_eq!(
            poll_until_terminal(&mut controller),
            ListeningState::Failed(FailureReason::NoSpeechDetected)
        );
        assert_eq!(controller.feedback_terminations(), 1);

        // stop after the result adds no second termination
        controller.stop();
        assert_eq!(controller.state(), ListeningState::Idle);
        assert_eq!(controller.feedback_terminations(), 1);
    }

    #[test]
    fn test_stop_terminates_feedback_once() {
        let (mut controller, gate) = controller(Ok("hello".into()));
        let now = Instant::now();
        controller.start(now).unwrap();
        assert!(!controller.poll(now).is_empty());

        controller.stop();
        controller.stop();
        assert_eq!(controller.state(), ListeningState::Idle);
        assert_eq!(controller.feedback_terminations(), 1);
        assert_eq!(controller.next_deadline(), None);

        let _ = gate.send(());
        thread::sleep(Duration::from_millis(50));
        assert!(controller.poll(Instant::now()).is_empty());
        assert_eq!(controller.state(), ListeningState::Idle);
    }

    #[test]
    fn test_late_message_discarded() {
        let (mut controller, _gate) = controller(Ok("unused".into()));
        let id = controller.start(Instant::now()).unwrap();
        controller.stop();

        // a result that raced past the cancel flag
        controller
            .msg_tx
            .send(CaptureMessage::Finished {
                session: id,
                result: Ok("what is gravity".into()),
            })
            .unwrap();

        let events = controller.poll(Instant::now());
        assert!(events
            .iter()
            .all(|e| !matches!(e, ListeningEvent::State(_))));
        assert_eq!(controller.state(), ListeningState::Idle);
        assert_eq!(controller.stale_messages_discarded(), 1);
    }

    #[test]
    fn test_message_from_previous_session_discarded() {
        let (mut controller, _gate) = controller(Ok("unused".into()));
        let old = controller.start(Instant::now()).unwrap();
        controller.stop();
        let current = controller.start(Instant::now()).unwrap();
        assert_ne!(old, current);

        controller
            .msg_tx
            .send(CaptureMessage::Captured { session: old })
            .unwrap();
        controller.poll(Instant::now());

        assert_eq!(controller.state(), ListeningState::Listening);
        assert_eq!(controller.stale_messages_discarded(), 1);
        controller.stop();
    }

    #[test]
    fn test_feedback_frames_follow_deadline() {
        let (mut controller, _gate) = controller(Ok("unused".into()));
        let t0 = Instant::now();
        controller.start(t0).unwrap();

        let frames = |events: Vec<ListeningEvent>| {
            events
                .into_iter()
                .filter(|e| matches!(e, ListeningEvent::Frame(_)))
                .count()
        };

        assert_eq!(frames(controller.poll(t0)), 1);
        assert_eq!(frames(controller.poll(t0 + Duration::from_millis(10))), 0);
        assert_eq!(frames(controller.poll(t0 + Duration::from_millis(50))), 1);
        assert_eq!(
            controller.next_deadline(),
            Some(t0 + Duration::from_millis(100))
        );
        controller.stop();
    }
}
