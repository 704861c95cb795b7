//! Configuration for the assistant
//!
//! Every section has serde defaults, so a missing or empty `scholar.toml`
//! yields the stock setup.

use super::search::SearchConfig;
use crate::audio::CaptureConfig;
use crate::knowledge::{KnowledgeBase, ProducerRegistry};
use crate::listening::ListeningConfig;
use crate::speech::{SpeechConfig, WhisperConfig};
use crate::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "SCHOLAR_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "scholar.toml";

/// Configuration for the complete assistant
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Knowledge file; the built-in curated set when absent
    pub knowledge_path: Option<PathBuf>,

    pub listening: ListeningConfig,

    /// Microphone phrase detection
    pub capture: CaptureConfig,

    /// STT (Whisper) configuration
    pub stt: WhisperConfig,

    /// TTS configuration
    pub speech: SpeechConfig,

    pub search: SearchConfig,
}

impl AssistantConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ScholarError::ConfigError(format!("Invalid config: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScholarError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// `$SCHOLAR_CONFIG`, then `./scholar.toml`, then defaults
    pub fn from_env() -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match locate(env_path, Path::new(DEFAULT_CONFIG_FILE)) {
            Some(path) => Self::load(path),
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Set the knowledge file
    pub fn with_knowledge_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.knowledge_path = Some(path.into());
        self
    }

    /// Set the listen timeout
    pub fn with_listen_timeout_secs(mut self, seconds: u64) -> Self {
        self.listening.listen_timeout_secs = seconds;
        self
    }

    /// Set the Whisper model path
    pub fn with_whisper_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.stt.model_path = path.into();
        self
    }

    /// Disable spoken answers (text-only mode)
    pub fn without_speech(mut self) -> Self {
        self.speech.enabled = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.listening.listen_timeout_secs == 0 {
            return Err(ScholarError::ConfigError(
                "listen_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.listening.feedback.interval_ms == 0 {
            return Err(ScholarError::ConfigError(
                "feedback interval_ms must be greater than 0".into(),
            ));
        }
        if self.capture.energy_threshold <= 0.0 || self.capture.max_phrase_secs <= 0.0 {
            return Err(ScholarError::ConfigError(
                "capture thresholds must be positive".into(),
            ));
        }
        if self.speech.enabled && self.speech.command.is_empty() {
            return Err(ScholarError::ConfigError(
                "speech command is required when speech is enabled".into(),
            ));
        }
        self.search.base_url()?;

        if let Some(ref path) = self.knowledge_path {
            if !path.exists() {
                return Err(ScholarError::ConfigError(format!(
                    "Knowledge file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Load the configured knowledge base
    pub fn load_knowledge(&self, registry: &ProducerRegistry) -> Result<KnowledgeBase> {
        match self.knowledge_path {
            Some(ref path) => KnowledgeBase::load(path, registry),
            None => KnowledgeBase::builtin(),
        }
    }
}

fn locate(env_path: Option<PathBuf>, local: &Path) -> Option<PathBuf> {
    env_path.or_else(|| local.exists().then(|| local.to_path_buf()))
}
