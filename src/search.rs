//! Nearest-neighbour ranking over an embedding collection.

use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::embeddings::{cosine_similarity, EmbeddingProvider, EmbeddingStore};
use crate::error::{DocscopeError, Result};

/// A ranked document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Rank `vectors` by cosine similarity to `query` and keep the best `top_n`.
///
/// Results are sorted by descending score; equal scores keep collection
/// order. An empty collection yields an empty result.
pub fn search(
    query: &[f32],
    ids: &[String],
    vectors: &[Vec<f32>],
    top_n: usize,
) -> Result<Vec<SearchResult>> {
    let Some(first) = vectors.first() else {
        return Ok(Vec::new());
    };
    if query.len() != first.len() {
        return Err(DocscopeError::DimensionMismatch {
            id: "<query>".into(),
            expected: first.len(),
            found: query.len(),
        });
    }

    let scores: Vec<f32> = vectors
        .par_iter()
        .map(|v| cosine_similarity(query, v))
        .collect();

    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    Ok(ranked
        .into_iter()
        .take(top_n)
        .filter_map(|(i, score)| {
            ids.get(i).map(|id| SearchResult {
                id: id.clone(),
                score,
            })
        })
        .collect())
}

/// Embed `text` with the given provider, then rank the store against it
pub async fn search_text(
    store: &EmbeddingStore,
    provider: &EmbeddingProvider,
    text: &str,
    top_n: usize,
) -> Result<Vec<SearchResult>> {
    if store.is_empty() {
        return Ok(Vec::new());
    }
    let query_embedding = provider.embed(text).await?;
    store.search(&query_embedding, top_n)
}

/// Leading text of a processed document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPreview {
    pub title: String,
    pub body: String,
    pub truncated: bool,
}

/// Read the first `max_chars` characters of a processed document.
///
/// Returns `None` when the document does not exist or the identifier is not a
/// plain file name.
pub fn preview_document(
    processed_dir: &Path,
    id: &str,
    max_chars: usize,
) -> Result<Option<DocumentPreview>> {
    if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
        return Ok(None);
    }
    let path = processed_dir.join(id);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let truncated = content.chars().count() > max_chars;
    let body = content.chars().take(max_chars).collect();

    Ok(Some(DocumentPreview {
        title: display_title(id),
        body,
        truncated,
    }))
}

/// `"rust_async_book.txt"` → `"Rust Async Book"`
pub fn display_title(id: &str) -> String {
    id.trim_end_matches(".txt")
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
