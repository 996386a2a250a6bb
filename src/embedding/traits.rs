//! Embedding provider traits

use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Get embedding dimensions (0 when unknown until the first call)
    fn dimensions(&self) -> usize;

    /// Compute embeddings for a batch of texts, in input order
    async fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Compute the embedding of a single text
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Embedding backend returned no vector"))
    }
}
