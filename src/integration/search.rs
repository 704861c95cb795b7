//! Web search fallback

use crate::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use tracing::{debug, info};
use url::Url;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint; the query goes in `q`
    pub base_url: String,
    /// Program used to open the URL; the platform opener when unset
    pub opener: Option<Vec<String>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            opener: None,
        }
    }
}

impl SearchConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            ScholarError::ConfigError(format!("Invalid search URL '{}': {}", self.base_url, e))
        })
    }
}

/// Opens a web search for a question the knowledge base could not answer
pub trait SearchLauncher: Send + Sync {
    /// Blank queries are a no-op
    fn search(&self, query: &str) -> Result<()>;
}

#[cfg(target_os = "macos")]
fn platform_opener() -> Vec<String> {
    vec!["open".into()]
}

#[cfg(target_os = "windows")]
fn platform_opener() -> Vec<String> {
    vec!["cmd".into(), "/C".into(), "start".into(), "".into()]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_opener() -> Vec<String> {
    vec!["xdg-open".into()]
}

/// Opens the search in the default browser
#[derive(Clone, Debug)]
pub struct BrowserSearch {
    base_url: Url,
    opener: Vec<String>,
}

impl BrowserSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let opener = config
            .opener
            .clone()
            .filter(|argv| !argv.is_empty())
            .unwrap_or_else(platform_opener);

        Ok(Self {
            base_url: config.base_url()?,
            opener,
        })
    }

    /// URL for `query`, or None when there is nothing to search for
    pub fn search_url(&self, query: &str) -> Option<Url> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        Some(url)
    }
}

impl SearchLauncher for BrowserSearch {
    fn search(&self, query: &str) -> Result<()> {
        let Some(url) = self.search_url(query) else {
            debug!("Empty search query, nothing to open");
            return Ok(());
        };

        let (program, args) = self
            .opener
            .split_first()
            .ok_or_else(|| ScholarError::SearchError("No URL opener configured".into()))?;

        info!("Opening search: {}", url);
        Command::new(program)
            .args(args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| ScholarError::SearchError(format!("Failed to open browser: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let search = BrowserSearch::new(&SearchConfig::default()).unwrap();
        let url = search.search_url("what is photosynthesis?").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.google.com/search?q=what+is+photosynthesis%3F"
        );
    }

    #[test]
    fn test_blank_query_is_noop() {
        let config = SearchConfig {
            opener: Some(vec!["scholar-no-such-opener".into()]),
            ..Default::default()
        };
        let search = BrowserSearch::new(&config).unwrap();
        assert!(search.search_url("   ").is_none());
        assert!(search.search("").is_ok());
    }

    #[test]
    fn test_opener_failure_is_search_error() {
        let config = SearchConfig {
            opener: Some(vec!["scholar-no-such-opener".into()]),
            ..Default::default()
        };
        let search = BrowserSearch::new(&config).unwrap();
        assert!(matches!(
            search.search("gravity"),
            Err(ScholarError::SearchError(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = SearchConfig {
            base_url: "::".into(),
            ..Default::default()
        };
        assert!(matches!(
            BrowserSearch::new(&config),
            Err(ScholarError::ConfigError(_))
        ));
    }
}
