//! Turns a matched pattern into answer text

use crate::knowledge::{KnowledgeBase, Responder};
use crate::{Result, ScholarError};
use tracing::{debug, error};

#[derive(Clone, Copy, Debug, Default)]
pub struct AnswerResolver;

impl AnswerResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `pattern` to its answer text
    ///
    /// Static text is returned unchanged. Dynamic producers run now, so
    /// clock-based answers reflect the moment of the query. A failing
    /// producer is reported as `ResolutionError`; no partial text is returned.
    pub fn resolve(&self, pattern: &str, knowledge: &KnowledgeBase) -> Result<String> {
        let responder = knowledge.lookup(pattern).ok_or_else(|| {
            ScholarError::ResolutionError(format!("No knowledge entry for '{}'", pattern))
        })?;

        match responder {
            Responder::StaticText(text) => Ok(text.clone()),
            Responder::DynamicText(producer) => {
                debug!("Invoking producer '{}' for '{}'", producer.name(), pattern);
                producer.invoke().map_err(|e| {
                    error!("Producer '{}' failed: {}", producer.name(), e);
                    match e {
                        ScholarError::ResolutionError(_) => e,
                        other => ScholarError::ResolutionError(format!(
                            "Producer '{}' failed: {}",
                            producer.name(),
                            other
                        )),
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn knowledge() -> KnowledgeBase {
        let epoch = Instant::now();
        KnowledgeBase::builder()
            .static_answer("what is gravity", "Gravity is a force.")
            .dynamic_fn("how long have you been running", "uptime", move || {
                Ok(format!("{} microseconds", epoch.elapsed().as_micros()))
            })
            .dynamic_fn("what is broken", "broken", || {
                Err(ScholarError::IOError("clock unavailable".into()))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_static_is_idempotent() {
        let kb = knowledge();
        let resolver = AnswerResolver::new();
        let first = resolver.resolve("what is gravity", &kb).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = resolver.resolve("what is gravity", &kb).unwrap();
        assert_eq!(first, "Gravity is a force.");
        assert_eq!(first, second);
    }

    #[test]
    fn test_dynamic_evaluated_per_call() {
        let kb = knowledge();
        let resolver = AnswerResolver::new();
        let first = resolver.resolve("how long have you been running", &kb).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = resolver.resolve("how long have you been running", &kb).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_producer_failure_propagates() {
        let kb = knowledge();
        let result = AnswerResolver::new().resolve("what is broken", &kb);
        match result {
            Err(ScholarError::ResolutionError(msg)) => assert!(msg.contains("clock unavailable")),
            other => panic!("Expected ResolutionError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_pattern() {
        let kb = knowledge();
        let result = AnswerResolver::new().resolve("who are you", &kb);
        assert!(matches!(result, Err(ScholarError::ResolutionError(_))));
    }
}
