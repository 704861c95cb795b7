//! TOML knowledge files
//!
//! ```toml
//! [[entry]]
//! question = "What is gravity"
//! answer = "Gravity is a force that attracts objects toward each other."
//!
//! [[entry]]
//! question = "What is the time"
//! dynamic = "current_time"
//! ```

use super::base::KnowledgeBase;
use super::producers::ProducerRegistry;
use crate::{Result, ScholarError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Curated set compiled into the binary
const BUILTIN_KNOWLEDGE: &str = include_str!("../../assets/knowledge.toml");

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default, rename = "entry")]
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntrySpec {
    question: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    dynamic: Option<String>,
}

impl KnowledgeBase {
    /// The curated default knowledge set
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_KNOWLEDGE, &ProducerRegistry::with_builtins())
    }

    /// Load a knowledge file from disk
    pub fn load<P: AsRef<Path>>(path: P, producers: &ProducerRegistry) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScholarError::KnowledgeError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let kb = Self::from_toml_str(&content, producers)?;
        info!("Loaded {} knowledge entries from {}", kb.len(), path.display());
        Ok(kb)
    }

    /// Parse knowledge from TOML text
    pub fn from_toml_str(content: &str, producers: &ProducerRegistry) -> Result<Self> {
        let file: KnowledgeFile = toml::from_str(content)
            .map_err(|e| ScholarError::KnowledgeError(format!("Invalid knowledge file: {}", e)))?;

        let mut builder = KnowledgeBase::builder();
        for entry in file.entries {
            builder = match (entry.answer, entry.dynamic) {
                (Some(answer), None) => builder.static_answer(&entry.question, answer),
                (None, Some(name)) => {
                    let producer = producers.get(&name).ok_or_else(|| {
                        ScholarError::KnowledgeError(format!(
                            "Unknown producer '{}' for question '{}'",
                            name, entry.question
                        ))
                    })?;
                    builder.dynamic_answer(&entry.question, producer)
                }
                (Some(_), Some(_)) => {
                    return Err(ScholarError::KnowledgeError(format!(
                        "Question '{}' has both an answer and a producer",
                        entry.question
                    )))
                }
                (None, None) => {
                    return Err(ScholarError::KnowledgeError(format!(
                        "Question '{}' has no answer",
                        entry.question
                    )))
                }
            };
        }

        builder.build()
    }
}
