//! Best-effort cluster names from document identifiers.
//!
//! Labels come from word frequencies in the member file names, not from the
//! document contents, so they describe how documents were named rather than
//! guaranteeing what a cluster is about.

use std::collections::HashMap;

use super::ClusterAssignment;

/// Words never used as keywords
pub const STOP_WORDS: &[&str] = &[
    "and", "the", "to", "of", "in", "for", "on", "with", "by", "a", "an", "is", "it", "are",
    "this", "that", "there", "their",
];

/// Keywords joined into a cluster label
pub const MAX_KEYWORDS: usize = 3;
/// Tokens this short or shorter are ignored
const MIN_TOKEN_LEN: usize = 2;

/// Suffix removed from identifiers before tokenising
pub const DOCUMENT_EXTENSION: &str = ".txt";
/// Word separator inside identifiers, besides whitespace
pub const WORD_SEPARATOR: char = '_';

/// `"tokio_async_guide.txt"` → `["tokio", "async", "guide"]`. Other
/// punctuation stays inside the token: `"async-book"` is one word.
fn tokens(id: &str) -> impl Iterator<Item = String> + '_ {
    id.strip_suffix(DOCUMENT_EXTENSION)
        .unwrap_or(id)
        .split(|c: char| c.is_whitespace() || c == WORD_SEPARATOR)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Most frequent qualifying tokens, ties broken by first appearance
pub fn cluster_keywords<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for id in ids {
        for token in tokens(id) {
            if token.chars().count() <= MIN_TOKEN_LEN || STOP_WORDS.contains(&token.as_str()) {
                continue;
            }
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }
    }

    // Stable sort keeps first-encountered order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(MAX_KEYWORDS);
    order
}

/// One label per cluster: top keywords joined by ", ", or `"Cluster {n}"`
/// (1-based) when no member name yields a keyword.
pub fn label_clusters(ids: &[String], assignment: &ClusterAssignment) -> Vec<String> {
    (0..assignment.k)
        .map(|cluster| {
            let keywords =
                cluster_keywords(assignment.members(cluster).map(|i| ids[i].as_str()));
            if keywords.is_empty() {
                format!("Cluster {}", cluster + 1)
            } else {
                keywords.join(", ")
            }
        })
        .collect()
}
