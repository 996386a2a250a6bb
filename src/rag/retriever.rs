//! Retriever - embeds a question and fetches its nearest chunks

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::embedding::{Embedder, EmbeddingProvider};
use crate::store::{Chunk, QdrantStore, VectorIndex};

use super::DEFAULT_TOP_K;

/// Fixed top-k lookup over a vector index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    query_instruction: String,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
            query_instruction: String::new(),
        }
    }

    /// Retriever over the configured Qdrant collection and embedding provider
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        if config.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be at least 1");
        }

        let embedder = EmbeddingProvider::from_config(&config.embedding, &config.http)?;
        let index = QdrantStore::from_config(&config.vector_store, &config.http);

        Ok(Self::new(Arc::new(embedder), Arc::new(index))
            .with_top_k(config.retrieval.top_k)
            .with_query_instruction(config.embedding.query_instruction.clone()))
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Prefix prepended to questions before embedding (BGE-style models)
    pub fn with_query_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.query_instruction = instruction.into();
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Fetch up to `top_k` chunks for `question`, most relevant first
    pub async fn retrieve(&self, question: &str) -> anyhow::Result<Vec<Chunk>> {
        let query = format!("{}{}", self.query_instruction, question);
        let vector = self.embedder.embed(&query).await?;

        let chunks = self.index.search(&vector, self.top_k).await?;
        debug!(
            "Retrieved {} chunks (k = {}) for a {}-char question",
            chunks.len(),
            self.top_k,
            question.len()
        );
        Ok(chunks)
    }
}
