//! Fuzzy matching of free text against knowledge patterns
//!
//! Scores are 0-100. Both sides are reduced to lowercase alphanumeric words
//! first, so punctuation and case do not lower the score. Word order and
//! extra words cost a little: reordered or padded questions score 95, and a
//! known question inside a much longer query scores 90.

use std::collections::BTreeSet;
use strsim::normalized_levenshtein;
use tracing::debug;

/// Minimum confidence for a match to be accepted
pub const ACCEPT_THRESHOLD: u8 = 85;

/// Weight of the word-order and word-set scores
const TOKEN_SCALE: f64 = 0.95;
/// Length ratio from which a longer query is aligned against the pattern
const PARTIAL_LENGTH_RATIO: f64 = 1.5;
const PARTIAL_SCALE: f64 = 0.9;
/// Beyond this length ratio a contained pattern says little about the query
const LONG_QUERY_RATIO: f64 = 8.0;
const LONG_QUERY_SCALE: f64 = 0.6;

/// Best pattern for a query, if any scored high enough
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    /// Matched pattern; `None` means no confident match
    pub pattern: Option<String>,
    /// 0-100; always >= the threshold when `pattern` is set, 0 otherwise
    pub confidence: u8,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            pattern: None,
            confidence: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.pattern.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct FuzzyMatcher {
    threshold: u8,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self {
            threshold: ACCEPT_THRESHOLD,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Find the best candidate for `query`
    ///
    /// Ties keep the first candidate encountered, so the result depends on
    /// candidate order only when two patterns score identically.
    pub fn find_best<'a, I>(&self, query: &str, candidates: I) -> MatchResult
    where
        I: IntoIterator<Item = &'a str>,
    {
        let processed_query = process(query);
        let mut best: Option<(&'a str, u8)> = None;

        for candidate in candidates {
            let score = score_processed(&processed_query, &process(candidate));
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((pattern, score)) if score >= self.threshold => {
                debug!("Matched '{}' -> '{}' ({})", query, pattern, score);
                MatchResult {
                    pattern: Some(pattern.to_string()),
                    confidence: score,
                }
            }
            Some((pattern, score)) => {
                debug!(
                    "Best candidate for '{}' was '{}' ({}), below threshold",
                    query, pattern, score
                );
                MatchResult::none()
            }
            None => MatchResult::none(),
        }
    }
}

/// Similarity of a raw query to a raw pattern, 0-100
pub fn similarity(query: &str, pattern: &str) -> u8 {
    score_processed(&process(query), &process(pattern))
}

/// Score a processed query against a processed pattern
///
/// Similar lengths take the best of the plain ratio and the scaled
/// token-sort and token-set ratios. A query at least 1.5 times longer than
/// the pattern is scored by the best window of the query instead, which is
/// how a question wrapped in filler words still matches. A query that much
/// shorter than the pattern only gets the plain ratio, so a fragment such as
/// "what is" never borrows the score of a full question.
fn score_processed(query: &str, pattern: &str) -> u8 {
    if query.is_empty() || pattern.is_empty() {
        return 0;
    }

    let query_len = query.chars().count();
    let pattern_len = pattern.chars().count();
    let length_ratio = query_len.max(pattern_len) as f64 / query_len.min(pattern_len) as f64;
    let base = ratio(query, pattern);

    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        let token_sort = ratio(&sort_tokens(query), &sort_tokens(pattern));
        let token_set = token_set_ratio(query, pattern);
        base.max(token_sort * TOKEN_SCALE)
            .max(token_set * TOKEN_SCALE)
    } else if query_len > pattern_len {
        let scale = if length_ratio > LONG_QUERY_RATIO {
            LONG_QUERY_SCALE
        } else {
            PARTIAL_SCALE
        };
        base.max(partial_ratio(pattern, query) * scale)
    } else {
        base
    };

    best.round() as u8
}

fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Compare the shared words alone and with each side's leftovers appended
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let words_a: BTreeSet<&str> = a.split_whitespace().collect();
    let words_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared: Vec<&str> = words_a.intersection(&words_b).copied().collect();
    let shared = shared.join(" ");
    let with_a = append_words(&shared, words_a.difference(&words_b).copied());
    let with_b = append_words(&shared, words_b.difference(&words_a).copied());

    ratio(&shared, &with_a)
        .max(ratio(&shared, &with_b))
        .max(ratio(&with_a, &with_b))
}

fn append_words<'a>(base: &str, words: impl Iterator<Item = &'a str>) -> String {
    let mut joined = base.to_string();
    for word in words {
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(word);
    }
    joined
}

/// Best ratio of `short` against every same-length window of `long`
fn partial_ratio(short: &str, long: &str) -> f64 {
    let width = short.chars().count();
    let chars: Vec<char> = long.chars().collect();
    if width == 0 || width >= chars.len() {
        return ratio(short, long);
    }

    chars
        .windows(width)
        .map(|window| ratio(short, &window.iter().collect::<String>()))
        .fold(0.0, f64::max)
}

/// Lowercase, turn every non-alphanumeric character into a separator,
/// collapse whitespace
pub fn process(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sort_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
