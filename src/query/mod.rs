//! Query resolution
//!
//! `QuerySession::run` normalizes the input, asks `FuzzyMatcher` for the
//! best knowledge pattern, and resolves it through `AnswerResolver`.

pub mod matcher;
pub mod resolver;
pub mod session;

pub use matcher::{similarity, FuzzyMatcher, MatchResult, ACCEPT_THRESHOLD};
pub use resolver::AnswerResolver;
pub use session::{QueryOutcome, QuerySession, UNKNOWN_ANSWER};
