//! Voice listening lifecycle
//!
//! A `ListeningController` runs one capture-and-transcribe session at a time
//! on a worker thread while its `FeedbackLoop` animates on the caller's loop.

pub mod capture;
pub mod controller;
pub mod feedback;
pub mod state;

pub use capture::{CaptureMessage, CaptureWorker};
pub use controller::{ListeningConfig, ListeningController, ListeningEvent};
pub use feedback::{FeedbackConfig, FeedbackLoop, WaveFrame};
pub use state::{FailureReason, ListeningOutcome, ListeningSession, ListeningState};
