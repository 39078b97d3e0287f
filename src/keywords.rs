//! Trending keyword extraction and counting.
//!
//! Words are pulled out of every checked text with a single regex, merged
//! with a fixed list of evergreen news topics and ranked by frequency.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Topics that always count once towards the trending list.
pub const PREDEFINED_TOPICS: [&str; 10] = [
    "elections",
    "government",
    "health",
    "technology",
    "ai",
    "economy",
    "covid",
    "sports",
    "education",
    "climate",
];

/// How many keywords the trending panel shows.
pub const TRENDING_LIMIT: usize = 10;

/// Minimum characters for a word to count as a keyword.
pub const MIN_KEYWORD_CHARS: usize = 4;

/// Maximal runs of letters, digits and underscores. Combining marks split runs.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").unwrap());

/// A word and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Lowercase words of four or more word characters, in source order.
///
/// The text is lowercased before matching, so case mappings that expand
/// into combining marks (`İ` becomes `i` + U+0307) split the word there.
///
/// # Examples
///
/// ```ignore
/// let words: Vec<String> = extract_keywords("The Aliens landed").collect();
/// assert_eq!(words, vec!["aliens", "landed"]);
/// ```
pub fn extract_keywords(text: &str) -> std::vec::IntoIter<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

/// Count tokens and return the `limit` most frequent.
///
/// Ties keep the order in which the tokens were first seen.
pub fn top_keywords<I, S>(tokens: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for token in tokens {
        let word = token.into();
        match positions.get(&word) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(word.clone(), counts.len());
                counts.push(KeywordCount { word, count: 1 });
            }
        }
    }

    // `sorted_by` is a stable sort, so equal counts stay in first-seen order.
    counts
        .into_iter()
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .take(limit)
        .collect()
}

/// Trending keywords across all given texts plus [`PREDEFINED_TOPICS`].
pub fn trending<'a, I>(texts: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens = texts
        .into_iter()
        .flat_map(extract_keywords)
        .chain(PREDEFINED_TOPICS.iter().map(|t| t.to_string()));
    top_keywords(tokens, limit)
}
