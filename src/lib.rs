// Library interface for docscope

pub mod cli;
pub mod cluster;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod geometry;
pub mod reduce;
pub mod search;
pub mod viz;

// Re-export commonly used types
pub use config::Config;
pub use embeddings::EmbeddingStore;
pub use error::{DocscopeError, Result};
pub use reduce::ReductionMethod;
pub use search::SearchResult;
pub use viz::{Scene, VizRequest};
