//! Integration layer: configuration, the `Assistant` coordinator and the
//! presentation and search boundaries it talks to.

pub mod assistant;
pub mod config;
pub mod presenter;
pub mod search;

pub use assistant::{Assistant, ANSWER_FAILED};
pub use config::AssistantConfig;
pub use presenter::Presenter;
pub use search::{BrowserSearch, SearchConfig, SearchLauncher};
