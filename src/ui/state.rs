//! What the window currently shows
//!
//! `ScreenState` is the GUI's `Presenter`: the assistant writes into it and
//! the widgets read from it on the next frame.

use crate::integration::Presenter;
use crate::listening::{ListeningState, WaveFrame};

#[derive(Debug, Clone)]
pub struct ScreenState {
    /// Question entry contents
    pub entry: String,
    pub status: String,
    /// Read-only answer box
    pub answer: String,
    /// Latest waveform frame; None draws the idle line
    pub frame: Option<WaveFrame>,
    pub fallback_visible: bool,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            entry: String::new(),
            status: ListeningState::Idle.status_message().to_string(),
            answer: String::new(),
            frame: None,
            fallback_visible: false,
        }
    }
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the waveform once listening is over
    pub fn clear_frame(&mut self) {
        self.frame = None;
    }
}

impl Presenter for ScreenState {
    fn display_result(&mut self, text: &str) {
        self.answer = text.to_string();
    }

    fn display_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn display_transcript(&mut self, text: &str) {
        self.entry = text.to_string();
    }

    fn display_frame(&mut self, frame: &WaveFrame) {
        self.frame = Some(frame.clone());
    }

    fn set_fallback_visible(&mut self, visible: bool) {
        self.fallback_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_ready() {
        let screen = ScreenState::new();
        assert_eq!(screen.status, "✅ Ready");
        assert!(screen.answer.is_empty());
        assert!(!screen.fallback_visible);
    }

    #[test]
    fn test_transcript_replaces_entry() {
        let mut screen = ScreenState::new();
        screen.entry = "typed".into();
        screen.display_transcript("what is gravity");
        assert_eq!(screen.entry, "what is gravity");
    }
}
