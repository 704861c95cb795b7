//! Cosmetic "listening" waveform
//!
//! The loop never schedules itself. Its owner asks for `next_deadline()`,
//! wakes up then, and calls `tick()`; each tick re-arms exactly one follow-up
//! deadline. `terminate()` clears the deadline, so an inactive loop has
//! nothing left to fire.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Waveform timing and shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Delay between ticks
    pub interval_ms: u64,
    /// Number of vertical bars
    pub bars: usize,
    /// Peak half-height of a bar
    pub amplitude: f32,
    /// Angular speed applied to elapsed seconds
    pub frequency: f32,
    /// Phase difference between neighbouring bars
    pub bar_phase_offset: f32,
    /// Phase advance per tick
    pub phase_step: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            bars: 6,
            amplitude: 18.0,
            frequency: 0.2,
            bar_phase_offset: 0.5,
            phase_step: 0.3,
        }
    }
}

impl FeedbackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// One rendered frame: signed half-height of each bar
#[derive(Clone, Debug, PartialEq)]
pub struct WaveFrame {
    pub bars: Vec<f32>,
    /// Frames produced so far in this run, starting at 1
    pub sequence: u64,
}

impl WaveFrame {
    pub fn peak(&self) -> f32 {
        self.bars.iter().fold(0.0f32, |max, b| max.max(b.abs()))
    }
}

#[derive(Debug)]
pub struct FeedbackLoop {
    config: FeedbackConfig,
    active: bool,
    phase: f32,
    started_at: Option<Instant>,
    next_tick: Option<Instant>,
    frames: u64,
    terminations: u64,
}

impl FeedbackLoop {
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            active: false,
            phase: 0.0,
            started_at: None,
            next_tick: None,
            frames: 0,
            terminations: 0,
        }
    }

    /// Activate; the first tick is due immediately
    pub fn begin(&mut self, now: Instant) {
        self.active = true;
        self.phase = 0.0;
        self.frames = 0;
        self.started_at = Some(now);
        self.next_tick = Some(now);
        debug!("Feedback loop started");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// When the next tick is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_tick.is_some_and(|due| now >= due)
    }

    /// Produce the next frame if a tick is due, and re-arm
    pub fn tick(&mut self, now: Instant) -> Option<WaveFrame> {
        if !self.active || !self.is_due(now) {
            return None;
        }

        let frame = self.frame_at(now);
        self.phase += self.config.phase_step;
        self.next_tick = Some(now + self.config.interval());
        Some(frame)
    }

    /// Frame for `now` at the current phase
    fn frame_at(&mut self, now: Instant) -> WaveFrame {
        let elapsed = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f32())
            .unwrap_or(0.0);

        let bars = (0..self.config.bars)
            .map(|i| {
                self.config.amplitude
                    * (self.config.frequency * elapsed
                        + i as f32 * self.config.bar_phase_offset
                        + self.phase)
                        .sin()
            })
            .collect();

        self.frames += 1;
        WaveFrame {
            bars,
            sequence: self.frames,
        }
    }

    /// Stop ticking; returns false if the loop was already inactive
    pub fn terminate(&mut self) -> bool {
        self.next_tick = None;
        if !self.active {
            return false;
        }
        self.active = false;
        self.terminations += 1;
        debug!("Feedback loop terminated after {} frames", self.frames);
        true
    }

    /// Number of times an active loop has been terminated
    pub fn terminations(&self) -> u64 {
        self.terminations
    }
}
