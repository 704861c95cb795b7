//! Assistant coordinator
//!
//! Glues the query core to the listening controller and the outer
//! boundaries. It lives on the owner loop (the UI update loop or a test) and
//! is the only thing that mutates session state; `pump` must be called
//! regularly while a session is active.

use super::config::AssistantConfig;
use super::presenter::Presenter;
use super::search::{BrowserSearch, SearchLauncher};
use crate::knowledge::{KnowledgeBase, ProducerRegistry};
use crate::listening::{
    ListeningController, ListeningEvent, ListeningOutcome, ListeningState,
};
use crate::query::{QueryOutcome, QuerySession};
use crate::speech::{SpeechCapture, Speaker, Transcriber};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Status shown when an answer could not be produced
pub const ANSWER_FAILED: &str = "Sorry, something went wrong answering that.";

pub struct Assistant {
    knowledge: KnowledgeBase,
    controller: ListeningController,
    speaker: Arc<dyn Speaker>,
    search: Arc<dyn SearchLauncher>,
    pending_fallback: Option<String>,
}

impl Assistant {
    pub fn new(
        knowledge: KnowledgeBase,
        controller: ListeningController,
        speaker: Arc<dyn Speaker>,
        search: Arc<dyn SearchLauncher>,
    ) -> Self {
        Self {
            knowledge,
            controller,
            speaker,
            search,
            pending_fallback: None,
        }
    }

    /// Build from configuration with the given speech backends
    pub fn from_config(
        config: &AssistantConfig,
        capture: Arc<dyn SpeechCapture>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Self> {
        let knowledge = config.load_knowledge(&ProducerRegistry::with_builtins())?;
        info!("Knowledge base ready with {} entries", knowledge.len());

        let controller = ListeningController::new(capture, transcriber, config.listening.clone());
        let search = BrowserSearch::new(&config.search)?;

        Ok(Self::new(
            knowledge,
            controller,
            config.speech.build_speaker(),
            Arc::new(search),
        ))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn controller(&self) -> &ListeningController {
        &self.controller
    }

    pub fn listening_state(&self) -> ListeningState {
        self.controller.state()
    }

    /// A capture session is in flight
    pub fn is_listening(&self) -> bool {
        self.controller.state().is_in_flight()
    }

    /// Query offered for web search after the last unanswered question
    pub fn pending_fallback(&self) -> Option<&str> {
        self.pending_fallback.as_deref()
    }

    /// Answer a typed or transcribed question
    ///
    /// The reply is displayed and spoken. Resolution failures show a generic
    /// status, speak nothing and are returned to the caller.
    pub fn ask(&mut self, text: &str, presenter: &mut dyn Presenter) -> Result<QueryOutcome> {
        if self.pending_fallback.take().is_some() {
            presenter.set_fallback_visible(false);
        }

        let outcome = match QuerySession::new(&self.knowledge).run(text) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to answer '{}': {}", text, e);
                presenter.display_status(&e.user_message());
                return Err(e);
            }
        };

        let reply = outcome.reply();
        presenter.display_result(reply);
        self.speaker.speak(reply);

        if let Some(query) = outcome.fallback_query() {
            self.pending_fallback = Some(query.to_string());
            presenter.set_fallback_visible(true);
        }

        Ok(outcome)
    }

    pub fn start_listening(&mut self, now: Instant, presenter: &mut dyn Presenter) -> Result<()> {
        self.controller.start(now)?;
        presenter.display_status(self.controller.state().status_message());
        Ok(())
    }

    pub fn stop_listening(&mut self, presenter: &mut dyn Presenter) {
        self.controller.stop();
        presenter.display_status(ListeningState::Idle.status_message());
    }

    /// Speak/Stop button behaviour
    pub fn toggle_listening(&mut self, now: Instant, presenter: &mut dyn Presenter) -> Result<()> {
        if self.is_listening() {
            self.stop_listening(presenter);
            Ok(())
        } else {
            self.start_listening(now, presenter)
        }
    }

    /// Drive the listening session: forward state changes and frames, and
    /// answer a finished transcript
    pub fn pump(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        for event in self.controller.poll(now) {
            match event {
                ListeningEvent::State(state) => presenter.display_status(state.status_message()),
                ListeningEvent::Frame(frame) => presenter.display_frame(&frame),
            }
        }

        match self.controller.take_outcome() {
            Some(ListeningOutcome::Transcript(text)) => {
                presenter.display_transcript(&text);
                if let Err(e) = self.ask(&text, presenter) {
                    debug!("Transcript '{}' went unanswered: {}", text, e);
                }
            }
            Some(ListeningOutcome::Failed(reason)) => {
                warn!("Listening failed: {}", reason);
            }
            None => {}
        }
    }

    /// When `pump` next needs to run, if a feedback tick is scheduled
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    /// Search the web for the last unanswered question
    pub fn search_fallback(&self) -> Result<()> {
        match self.pending_fallback.as_deref() {
            Some(query) => self.search.search(query),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::UNKNOWN_ANSWER;
    use crate::speech::{NoMicrophone, UnavailableTranscriber};
    use crate::ScholarError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingPresenter {
        results: Vec<String>,
        statuses: Vec<String>,
        fallback_visible: bool,
    }

    impl Presenter for RecordingPresenter {
        fn display_result(&mut self, text: &str) {
            self.results.push(text.to_string());
        }

        fn display_status(&mut self, status: &str) {
            self.statuses.push(status.to_string());
        }

        fn set_fallback_visible(&mut self, visible: bool) {
            self.fallback_visible = visible;
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker(Mutex<Vec<String>>);

    impl Speaker for RecordingSpeaker {
        fn speak(&self, text: &str) {
            self.0.lock().push(text.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingSearch(Mutex<Vec<String>>);

    impl SearchLauncher for RecordingSearch {
        fn search(&self, query: &str) -> Result<()> {
            self.0.lock().push(query.to_string());
            Ok(())
        }
    }

    fn assistant(
        knowledge: KnowledgeBase,
    ) -> (Assistant, Arc<RecordingSpeaker>, Arc<RecordingSearch>) {
        let speaker = Arc::new(RecordingSpeaker::default());
        let search = Arc::new(RecordingSearch::default());
        let controller = ListeningController::new(
            Arc::new(NoMicrophone::new("none")),
            Arc::new(UnavailableTranscriber::new("none")),
            Default::default(),
        );
        let assistant = Assistant::new(knowledge, controller, speaker.clone(), search.clone());
        (assistant, speaker, search)
    }

    #[test]
    fn test_answered_question_is_displayed_and_spoken() {
        let (mut assistant, speaker, _) = assistant(KnowledgeBase::builtin().unwrap());
        let mut presenter = RecordingPresenter::default();

        let outcome = assistant.ask("What is gravity?", &mut presenter).unwrap();
        assert!(matches!(outcome, QueryOutcome::Answered(_)));
        assert_eq!(presenter.results.len(), 1);
        assert_eq!(speaker.0.lock().as_slice(), presenter.results.as_slice());
        assert!(!presenter.fallback_visible);
        assert_eq!(assistant.pending_fallback(), None);
    }

    #[test]
    fn test_unanswered_offers_fallback_until_next_query() {
        let (mut assistant, _, search) = assistant(KnowledgeBase::builtin().unwrap());
        let mut presenter = RecordingPresenter::default();

        assistant
            .ask("Explain photosynthesis", &mut presenter)
            .unwrap();
        assert_eq!(presenter.results, vec![UNKNOWN_ANSWER]);
        assert!(presenter.fallback_visible);
        assert_eq!(assistant.pending_fallback(), Some("Explain photosynthesis"));

        assistant.search_fallback().unwrap();
        assert_eq!(search.0.lock().as_slice(), ["Explain photosynthesis"]);

        assistant.ask("who created you", &mut presenter).unwrap();
        assert!(!presenter.fallback_visible);
        assert_eq!(assistant.pending_fallback(), None);
    }

    #[test]
    fn test_resolution_failure_shows_generic_status() {
        let kb = KnowledgeBase::builder()
            .dynamic_fn("what is the time", "broken_clock", || {
                Err(ScholarError::ResolutionError("clock unavailable".into()))
            })
            .build()
            .unwrap();
        let (mut assistant, speaker, _) = assistant(kb);
        let mut presenter = RecordingPresenter::default();

        let err = assistant.ask("what is the time", &mut presenter).unwrap_err();
        assert!(matches!(err, ScholarError::ResolutionError(_)));
        assert_eq!(presenter.statuses, vec![ANSWER_FAILED]);
        assert!(presenter.results.is_empty());
        assert!(speaker.0.lock().is_empty());
    }

    #[test]
    fn test_search_without_pending_query_is_noop() {
        let (assistant, _, search) = assistant(KnowledgeBase::builtin().unwrap());
        assistant.search_fallback().unwrap();
        assert!(search.0.lock().is_empty());
    }
}
