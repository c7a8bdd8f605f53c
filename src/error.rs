use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No embedding collection at {0}. Run 'docscope embed' first.")]
    NotReady(PathBuf),

    #[error("Unknown reduction method '{0}'. Use 'tsne', 'umap' or 'pca'.")]
    InvalidMethod(String),

    #[error("Invalid cluster count {k}: must be between 1 and {n}")]
    InvalidK { k: usize, n: usize },

    #[error("Embedding for '{id}' has dimension {found}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Embedding for '{0}' contains NaN or infinite values")]
    NonFiniteEmbedding(String),

    #[error("Duplicate document identifier: {0}")]
    DuplicateId(String),

    #[error("Cannot reduce {ambient}-d vectors to {target} dimensions")]
    InvalidDimension { target: usize, ambient: usize },

    #[error("Clustering failed: {0}")]
    Clustering(String),

    #[error("Reduction failed: {0}")]
    Reduction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DocscopeError>;
