//! Curated question/answer knowledge
//!
//! - `base`: the immutable pattern -> responder table
//! - `producers`: named dynamic producers (clock, calendar)
//! - `loader`: TOML knowledge files and the built-in set

pub mod base;
pub mod loader;
pub mod producers;

pub use base::{
    normalize, DynamicProducer, KnowledgeBase, KnowledgeBaseBuilder, KnowledgeEntry, ProducerFn,
    Responder,
};
pub use producers::ProducerRegistry;
