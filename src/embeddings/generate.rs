use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use super::{EmbeddingProvider, EmbeddingStore};
use crate::config::Config;
use crate::error::{DocscopeError, Result};

/// A processed document ready to be embedded
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub id: String,
    pub text: String,
}

/// Read every non-empty document in `dir`, sorted by file name.
pub fn collect_documents(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.exists() {
        return Err(DocscopeError::NotReady(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let text = std::fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            tracing::warn!("skipping empty document {}", id);
            continue;
        }
        documents.push(SourceDocument { id, text });
    }

    Ok(documents)
}

/// Embed every processed document and persist the resulting collection.
///
/// Regeneration replaces the previous collection wholesale.
pub async fn generate_embeddings(
    config: &Config,
    provider: &EmbeddingProvider,
) -> Result<EmbeddingStore> {
    let documents = collect_documents(&config.processed_dir)?;
    let mut store = EmbeddingStore::new(config.embeddings_path.clone());

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| DocscopeError::Config(format!("progress template: {}", e)))?
            .progress_chars("=>-"),
    );

    for doc in documents {
        pb.set_message(doc.id.clone());
        let embedding = provider.embed(&doc.text).await?;
        if embedding.len() != config.embedding_dim {
            pb.abandon();
            return Err(DocscopeError::DimensionMismatch {
                id: doc.id,
                expected: config.embedding_dim,
                found: embedding.len(),
            });
        }
        store.insert(doc.id, embedding)?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    store.save()?;
    Ok(store)
}
