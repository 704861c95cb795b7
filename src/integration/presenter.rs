use crate::listening::WaveFrame;

/// Presentation boundary: where answers, statuses and waveform frames go
///
/// Only the first two are required; a text front-end can ignore the rest.
pub trait Presenter {
    /// Answer text for the answer box
    fn display_result(&mut self, text: &str);

    fn display_status(&mut self, status: &str);

    /// A finished transcript, before it is answered
    fn display_transcript(&mut self, _text: &str) {}

    fn display_frame(&mut self, _frame: &WaveFrame) {}

    /// Show or hide the web search action
    fn set_fallback_visible(&mut self, _visible: bool) {}
}
