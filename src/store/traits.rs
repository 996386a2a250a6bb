//! Vector index traits

use async_trait::async_trait;

use super::Chunk;

/// Similarity search over an externally managed index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` chunks nearest to `vector`, most similar first
    async fn search(&self, vector: &[f32], k: usize) -> anyhow::Result<Vec<Chunk>>;
}
