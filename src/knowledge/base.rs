//! Immutable pattern -> responder table
//!
//! Patterns are normalized once when the table is built, so lookups and the
//! matcher never have to normalize them again. There is no way to add or
//! remove entries after `build()`.

use crate::{Result, ScholarError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Zero-argument function producing an answer at the moment it is asked
pub type ProducerFn = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Named dynamic answer producer
#[derive(Clone)]
pub struct DynamicProducer {
    name: String,
    produce: ProducerFn,
}

impl DynamicProducer {
    pub fn new(name: impl Into<String>, produce: ProducerFn) -> Self {
        Self {
            name: name.into(),
            produce,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the producer now
    pub fn invoke(&self) -> Result<String> {
        (self.produce)()
    }
}

impl fmt::Debug for DynamicProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProducer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a pattern answers with
#[derive(Clone, Debug)]
pub enum Responder {
    /// Fixed text, returned unchanged
    StaticText(String),
    /// Computed at resolution time
    DynamicText(DynamicProducer),
}

impl Responder {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Responder::DynamicText(_))
    }
}

#[derive(Clone, Debug)]
pub struct KnowledgeEntry {
    pub pattern: String,
    pub responder: Responder,
}

/// Trim and lowercase; the canonical form of every stored pattern
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Read-only knowledge table, shared process-wide behind an `Arc`
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// Find the responder for an already-normalized pattern
    pub fn lookup(&self, pattern: &str) -> Option<&Responder> {
        self.index
            .get(pattern)
            .map(|&i| &self.entries[i].responder)
    }

    /// All patterns, in the order they were added
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.pattern.as_str())
    }

    pub fn all_patterns(&self) -> Vec<&str> {
        self.patterns().collect()
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects entries and validates them into a `KnowledgeBase`
#[derive(Default)]
pub struct KnowledgeBaseBuilder {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBaseBuilder {
    /// Add a question with a fixed answer
    pub fn static_answer(mut self, question: &str, answer: impl Into<String>) -> Self {
        self.entries.push(KnowledgeEntry {
            pattern: normalize(question),
            responder: Responder::StaticText(answer.into()),
        });
        self
    }

    /// Add a question answered by a producer
    pub fn dynamic_answer(mut self, question: &str, producer: DynamicProducer) -> Self {
        self.entries.push(KnowledgeEntry {
            pattern: normalize(question),
            responder: Responder::DynamicText(producer),
        });
        self
    }

    /// Add a question answered by a closure
    pub fn dynamic_fn<F>(self, question: &str, name: &str, produce: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.dynamic_answer(question, DynamicProducer::new(name, Arc::new(produce)))
    }

    pub fn build(self) -> Result<KnowledgeBase> {
        let mut index = HashMap::with_capacity(self.entries.len());

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.pattern.is_empty() {
                return Err(ScholarError::KnowledgeError(format!(
                    "Entry {} has an empty question",
                    i + 1
                )));
            }
            if index.insert(entry.pattern.clone(), i).is_some() {
                return Err(ScholarError::KnowledgeError(format!(
                    "Duplicate question: '{}'",
                    entry.pattern
                )));
            }
        }

        Ok(KnowledgeBase {
            entries: self.entries,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_normalized() {
        let kb = KnowledgeBase::builder()
            .static_answer("  What Is Gravity ", "A force.")
            .build()
            .unwrap();

        assert_eq!(kb.all_patterns(), vec!["what is gravity"]);
        assert!(kb.lookup("what is gravity").is_some());
        assert!(kb.lookup("What Is Gravity").is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let kb = KnowledgeBase::builder()
            .static_answer("b", "2")
            .static_answer("a", "1")
            .static_answer("c", "3")
            .build()
            .unwrap();

        assert_eq!(kb.all_patterns(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_after_normalization_rejected() {
        let result = KnowledgeBase::builder()
            .static_answer("who created you", "x")
            .static_answer("WHO CREATED YOU ", "y")
            .build();

        assert!(matches!(result, Err(ScholarError::KnowledgeError(_))));
    }

    #[test]
    fn test_empty_question_rejected() {
        let result = KnowledgeBase::builder().static_answer("   ", "x").build();
        assert!(matches!(result, Err(ScholarError::KnowledgeError(_))));
    }

    #[test]
    fn test_dynamic_responder_is_not_invoked_at_build() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let kb = KnowledgeBase::builder()
            .dynamic_fn("count", "counter", move || {
                Ok(counter.fetch_add(1, Ordering::SeqCst).to_string())
            })
            .build()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        match kb.lookup("count") {
            Some(Responder::DynamicText(p)) => {
                assert_eq!(p.name(), "counter");
                assert_eq!(p.invoke().unwrap(), "0");
            }
            other => panic!("Expected dynamic responder, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
