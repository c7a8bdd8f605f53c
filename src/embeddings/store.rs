use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocscopeError, Result};
use crate::search::{self, SearchResult};

/// One persisted identifier → vector pair
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEmbedding {
    id: String,
    embedding: Vec<f32>,
}

/// In-memory embedding collection with JSON persistence.
///
/// All vectors share one dimensionality and identifiers are unique; both are
/// enforced on insert, so a store obtained from [`EmbeddingStore::load`] is
/// always consistent.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    pub ids: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
    pub index_path: PathBuf,
    seen: HashSet<String>,
}

impl EmbeddingStore {
    /// Create new empty store
    pub fn new(index_path: PathBuf) -> Self {
        Self {
            ids: Vec::new(),
            vectors: Vec::new(),
            index_path,
            seen: HashSet::new(),
        }
    }

    /// Load from JSON file. A missing file is reported as `NotReady`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::try_load(path)?.ok_or_else(|| DocscopeError::NotReady(path.to_path_buf()))
    }

    /// Load from JSON file, `None` when nothing has been generated yet
    pub fn try_load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let entries: Vec<StoredEmbedding> = serde_json::from_str(&content)?;

        let mut store = Self::new(path.to_path_buf());
        for entry in entries {
            store.insert(entry.id, entry.embedding)?;
        }

        tracing::info!(
            documents = store.len(),
            dimension = store.dimension().unwrap_or(0),
            "loaded embedding collection from {}",
            path.display()
        );
        Ok(Some(store))
    }

    /// Save to JSON file, creating the containing directory if needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let entries: Vec<StoredEmbedding> = self
            .ids
            .iter()
            .zip(self.vectors.iter())
            .map(|(id, embedding)| StoredEmbedding {
                id: id.clone(),
                embedding: embedding.clone(),
            })
            .collect();
        let json = serde_json::to_string(&entries)?;
        std::fs::write(&self.index_path, json)?;

        tracing::info!(
            documents = self.len(),
            "saved embedding collection to {}",
            self.index_path.display()
        );
        Ok(())
    }

    /// Add a document, rejecting duplicates, mismatched dimensionality and
    /// NaN or infinite components
    pub fn insert(&mut self, id: String, embedding: Vec<f32>) -> Result<()> {
        if !embedding.iter().all(|x| x.is_finite()) {
            return Err(DocscopeError::NonFiniteEmbedding(id));
        }
        if let Some(expected) = self.dimension() {
            if embedding.len() != expected {
                return Err(DocscopeError::DimensionMismatch {
                    id,
                    expected,
                    found: embedding.len(),
                });
            }
        }
        if !self.seen.insert(id.clone()) {
            return Err(DocscopeError::DuplicateId(id));
        }
        self.ids.push(id);
        self.vectors.push(embedding);
        Ok(())
    }

    /// Shared vector dimensionality, `None` for an empty store
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rank stored documents against a query embedding
    pub fn search(&self, query_embedding: &[f32], top_n: usize) -> Result<Vec<SearchResult>> {
        search::search(query_embedding, &self.ids, &self.vectors, top_n)
    }
}
