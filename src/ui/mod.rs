//! egui/eframe front-end for the assistant

mod app;
pub mod components;
mod state;
mod theme;

pub use app::{ScholarApp, WINDOW_TITLE};
pub use components::Waveform;
pub use state::ScreenState;
pub use theme::Theme;
