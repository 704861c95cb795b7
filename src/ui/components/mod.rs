//! Reusable UI components

pub mod waveform;

pub use waveform::Waveform;
