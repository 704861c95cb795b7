//! One end-to-end query: normalize, match, resolve

use super::matcher::FuzzyMatcher;
use super::resolver::AnswerResolver;
use crate::knowledge::{normalize, KnowledgeBase};
use crate::Result;
use tracing::{debug, info};

/// Spoken when no confident match exists
pub const UNKNOWN_ANSWER: &str = "I don't know the answer to that.";

/// Result of running a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Fully resolved answer text
    Answered(String),
    /// No confident match; carries the query exactly as the user gave it
    Unanswered(String),
}

impl QueryOutcome {
    /// Text to display and speak for this outcome
    pub fn reply(&self) -> &str {
        match self {
            QueryOutcome::Answered(text) => text,
            QueryOutcome::Unanswered(_) => UNKNOWN_ANSWER,
        }
    }

    /// Query to offer a web search for, if any
    pub fn fallback_query(&self) -> Option<&str> {
        match self {
            QueryOutcome::Answered(_) => None,
            QueryOutcome::Unanswered(query) => Some(query),
        }
    }

    pub fn offers_fallback(&self) -> bool {
        self.fallback_query().is_some()
    }
}

/// Stateless query runner over a read-only knowledge base
///
/// Holds no history, so one session can serve any number of queries and be
/// shared between threads.
#[derive(Clone, Debug)]
pub struct QuerySession<'a> {
    knowledge: &'a KnowledgeBase,
    matcher: FuzzyMatcher,
    resolver: AnswerResolver,
}

impl<'a> QuerySession<'a> {
    pub fn new(knowledge: &'a KnowledgeBase) -> Self {
        Self {
            knowledge,
            matcher: FuzzyMatcher::new(),
            resolver: AnswerResolver::new(),
        }
    }

    pub fn run(&self, raw_input: &str) -> Result<QueryOutcome> {
        let query = normalize(raw_input);
        let best = self.matcher.find_best(&query, self.knowledge.patterns());

        match best.pattern {
            Some(pattern) => {
                let answer = self.resolver.resolve(&pattern, self.knowledge)?;
                info!("Answered '{}' via '{}' ({})", query, pattern, best.confidence);
                Ok(QueryOutcome::Answered(answer))
            }
            None => {
                debug!("No confident match for '{}'", query);
                Ok(QueryOutcome::Unanswered(raw_input.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScholarError;

    #[test]
    fn test_answered() {
        let kb = KnowledgeBase::builtin().unwrap();
        let outcome = QuerySession::new(&kb).run("What is gravity?").unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Answered(
                "Gravity is a force that attracts objects toward each other.".to_string()
            )
        );
        assert!(!outcome.offers_fallback());
    }

    #[test]
    fn test_unanswered_keeps_original_text() {
        let kb = KnowledgeBase::builtin().unwrap();
        let outcome = QuerySession::new(&kb).run("  AsdKJasdkj ").unwrap();
        assert_eq!(outcome, QueryOutcome::Unanswered("  AsdKJasdkj ".to_string()));
        assert_eq!(outcome.reply(), UNKNOWN_ANSWER);
        assert_eq!(outcome.fallback_query(), Some("  AsdKJasdkj "));
    }

    #[test]
    fn test_dynamic_answer_resolved() {
        let kb = KnowledgeBase::builtin().unwrap();
        match QuerySession::new(&kb).run("what is the time").unwrap() {
            QueryOutcome::Answered(text) => assert!(text.starts_with("The current time is ")),
            other => panic!("Expected answer, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_error_surfaces() {
        let kb = KnowledgeBase::builder()
            .dynamic_fn("what is the time", "clock", || {
                Err(ScholarError::ResolutionError("clock stopped".into()))
            })
            .build()
            .unwrap();

        let result = QuerySession::new(&kb).run("What is the time?");
        assert!(matches!(result, Err(ScholarError::ResolutionError(_))));
    }

    #[test]
    fn test_runs_are_independent() {
        let kb = KnowledgeBase::builtin().unwrap();
        let session = QuerySession::new(&kb);
        assert!(session.run("nonsense words").unwrap().offers_fallback());
        assert!(!session.run("who created you").unwrap().offers_fallback());
        assert!(session.run("nonsense words").unwrap().offers_fallback());
    }
}
