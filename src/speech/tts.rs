//! Text-to-speech through a system synthesizer program

use super::Speaker;
use crate::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// TTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speak answers out loud
    pub enabled: bool,
    /// Synthesizer argv; the text is appended as the last argument
    pub command: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["espeak".to_string(), "-s".to_string(), "150".to_string()],
        }
    }
}

impl SpeechConfig {
    /// Build the speaker this configuration describes
    pub fn build_speaker(&self) -> Arc<dyn Speaker> {
        if !self.enabled {
            return Arc::new(LogSpeaker);
        }
        match CommandSpeaker::new(self.command.clone()) {
            Ok(speaker) => Arc::new(speaker),
            Err(e) => {
                warn!("Speech output disabled: {}", e);
                Arc::new(LogSpeaker)
            }
        }
    }
}

/// Runs an external synthesizer (espeak, say, ...) per utterance
#[derive(Clone, Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(command: Vec<String>) -> Result<Self> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ScholarError::ConfigError("Speech command is empty".into()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Spawn the synthesizer; a detached thread reaps it
    pub fn try_speak(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let program = self.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => warn!("{} exited with {}", program, status),
            Ok(_) => debug!("{} finished speaking", program),
            Err(e) => warn!("Failed to wait for {}: {}", program, e),
        });
        Ok(())
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) {
        if let Err(e) = self.try_speak(text) {
            warn!("Could not speak via '{}': {}", self.program, e);
        }
    }
}

/// Silent speaker that only records what would have been said
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str) {
        info!("(speech) {}", text);
    }
}
