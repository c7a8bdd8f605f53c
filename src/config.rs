use std::path::{Path, PathBuf};

use crate::embeddings::EMBEDDING_DIM;
use crate::error::{DocscopeError, Result};

/// Results returned by `search` when `--top` is not given
pub const DEFAULT_TOP_N: usize = 5;
/// Cluster count used by `viz` when `--clusters` is not given
pub const DEFAULT_CLUSTERS: usize = 6;
/// Seed shared by every randomized step (k-means, t-SNE, UMAP)
pub const DEFAULT_SEED: u64 = 42;
/// Characters shown by `show` before truncating
pub const PREVIEW_CHARS: usize = 1000;

const EMBEDDINGS_DIR: &str = "embeddings";
const EMBEDDINGS_FILE: &str = "document_embeddings.json";
const PROCESSED_DIR: &str = "processed";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of all docscope data
    pub data_dir: PathBuf,
    /// Cleaned plain-text documents, one file per document
    pub processed_dir: PathBuf,
    /// Persisted embedding collection
    pub embeddings_path: PathBuf,
    /// Expected dimensionality of freshly generated embeddings
    pub embedding_dim: usize,
}

impl Config {
    pub fn load(data_dir_override: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir.to_path_buf(),
            None => match std::env::var_os("DOCSCOPE_HOME") {
                Some(dir) => PathBuf::from(dir),
                None => dirs::home_dir()
                    .ok_or_else(|| {
                        DocscopeError::Config("Could not determine home directory".into())
                    })?
                    .join(".docscope"),
            },
        };

        let embedding_dim = match std::env::var("DOCSCOPE_EMBEDDING_DIM") {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                DocscopeError::Config(format!("DOCSCOPE_EMBEDDING_DIM is not a number: {}", raw))
            })?,
            Err(_) => EMBEDDING_DIM,
        };

        Ok(Self::at(data_dir, embedding_dim))
    }

    /// Build a config rooted at `data_dir` without consulting the environment
    pub fn at(data_dir: PathBuf, embedding_dim: usize) -> Self {
        Config {
            processed_dir: data_dir.join(PROCESSED_DIR),
            embeddings_path: data_dir.join(EMBEDDINGS_DIR).join(EMBEDDINGS_FILE),
            data_dir,
            embedding_dim,
        }
    }
}
