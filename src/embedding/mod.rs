//! Embedding module - compute embeddings from text

mod ollama;
mod openai;
mod traits;
mod truncate;

#[cfg(feature = "local-embeddings")]
mod candle;

pub use traits::Embedder;
pub use truncate::{get_token_limit, truncate_to_token_limit};

use async_trait::async_trait;
use tracing::info;

use crate::config::{EmbeddingConfig, HttpConfig};

/// Checkpoint behind collections populated by LangChain's BGE loader
///
/// Points carrying no recorded `embedding_model` are assumed to come from it.
pub const REFERENCE_EMBEDDING_MODEL: &str = "BAAI/bge-large-en";

/// Embedding mode configuration
#[derive(Debug, Clone)]
pub enum EmbeddingMode {
    OpenAI {
        api_key: Option<String>,
        base_url: Option<String>,
    },
    Ollama {
        host: Option<String>,
        timeout_secs: u64,
    },
    #[cfg(feature = "local-embeddings")]
    Local {
        model_path: Option<String>,
        normalize: bool,
    },
}

impl EmbeddingMode {
    /// Resolve the mode named by `[embedding] provider`
    pub fn from_config(config: &EmbeddingConfig, http: &HttpConfig) -> anyhow::Result<Self> {
        match config.provider.as_str() {
            "openai" => Ok(Self::OpenAI {
                api_key: config.api_key.clone(),
                base_url: config.base_url.clone(),
            }),
            "ollama" => Ok(Self::Ollama {
                host: config.host.clone(),
                timeout_secs: http.timeout_secs,
            }),
            #[cfg(feature = "local-embeddings")]
            "local" => Ok(Self::Local {
                model_path: config.model_path.clone(),
                normalize: config.normalize,
            }),
            #[cfg(not(feature = "local-embeddings"))]
            "local" => anyhow::bail!(
                "Local embeddings require building with --features local-embeddings"
            ),
            other => anyhow::bail!("Unknown embedding provider: {}", other),
        }
    }
}

/// Unified embedding provider
pub struct EmbeddingProvider {
    model_name: String,
    dimensions: usize,
    inner: EmbeddingProviderInner,
}

enum EmbeddingProviderInner {
    OpenAI(openai::OpenAIEmbedding),
    Ollama(ollama::OllamaEmbedding),
    #[cfg(feature = "local-embeddings")]
    Local(candle::CandleEmbedding),
}

impl EmbeddingProvider {
    /// Create a new embedding provider
    pub fn new(model_name: String, mode: EmbeddingMode) -> anyhow::Result<Self> {
        let (inner, dimensions) = match mode {
            EmbeddingMode::OpenAI { api_key, base_url } => {
                let provider = openai::OpenAIEmbedding::new(model_name.clone(), api_key, base_url)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::OpenAI(provider), dims)
            }
            EmbeddingMode::Ollama { host, timeout_secs } => {
                let provider = ollama::OllamaEmbedding::new(model_name.clone(), host, timeout_secs)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::Ollama(provider), dims)
            }
            #[cfg(feature = "local-embeddings")]
            EmbeddingMode::Local { model_path, normalize } => {
                let provider = candle::CandleEmbedding::new(model_name.clone(), model_path, normalize)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::Local(provider), dims)
            }
        };

        info!(
            "Initialized embedding provider: {} ({} dims)",
            model_name, dimensions
        );

        Ok(Self {
            model_name,
            dimensions,
            inner,
        })
    }

    /// Create the provider described by the `[embedding]` config section
    pub fn from_config(config: &EmbeddingConfig, http: &HttpConfig) -> anyhow::Result<Self> {
        let mode = EmbeddingMode::from_config(config, http)?;
        Self::new(config.model_name(), mode)
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl Embedder for EmbeddingProvider {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        match &self.inner {
            EmbeddingProviderInner::OpenAI(p) => p.embed(texts).await,
            EmbeddingProviderInner::Ollama(p) => p.embed(texts).await,
            #[cfg(feature = "local-embeddings")]
            EmbeddingProviderInner::Local(p) => p.embed(texts),
        }
    }
}

/// Query prefixes for asymmetric embedding models
pub mod templates {
    /// BGE English query instruction
    pub const BGE_QUERY: &str = "Represent this question for searching relevant passages: ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_default_config() {
        let mode = EmbeddingMode::from_config(&EmbeddingConfig::default(), &HttpConfig::default())
            .unwrap();
        assert!(matches!(mode, EmbeddingMode::Ollama { host: None, timeout_secs: 120 }));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = EmbeddingConfig {
            provider: "word2vec".to_string(),
            ..Default::default()
        };
        let err = EmbeddingMode::from_config(&config, &HttpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("word2vec"));
    }
}
