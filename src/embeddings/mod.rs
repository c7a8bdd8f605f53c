pub mod generate;
pub mod provider;
pub mod store;

pub use provider::EmbeddingProvider;
pub use store::EmbeddingStore;

/// Default embedding dimension (all-mpnet-base-v2, nomic-embed-text, text-embedding-004)
pub const EMBEDDING_DIM: usize = 768;

/// Cosine similarity between two vectors.
///
/// Mismatched lengths and zero-magnitude vectors score 0.0 rather than
/// producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}
