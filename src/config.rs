//! Configuration file support for devchat
//!
//! Config file location: ~/.config/devchat/config.toml
//!
//! Example config:
//! ```toml
//! [embedding]
//! provider = "local"  # ollama, openai, local
//! model = "BAAI/bge-large-en"
//!
//! [llm]
//! provider = "ollama"  # ollama, openai, simulated
//! model = "llama2"
//! temperature = 0.5
//!
//! [vector_store]
//! url = "http://localhost:6333"
//! collection = "vector_db"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::embedding::templates::BGE_QUERY;
use crate::embedding::REFERENCE_EMBEDDING_MODEL;
use crate::http::DEFAULT_TIMEOUT_SECS;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider type: ollama, openai, local
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model name (defaults per provider, see `model_name`)
    pub model: Option<String>,

    /// Host for Ollama (e.g., http://localhost:11434)
    pub host: Option<String>,

    /// Base URL for OpenAI-compatible APIs
    pub base_url: Option<String>,

    /// API key for OpenAI
    pub api_key: Option<String>,

    /// Prefix prepended to questions before embedding (empty disables it)
    #[serde(default = "default_query_instruction")]
    pub query_instruction: String,

    /// L2-normalize local embeddings
    #[serde(default)]
    pub normalize: bool,

    /// Local model directory (config.json, tokenizer.json, model.safetensors)
    pub model_path: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: None,
            host: None,
            base_url: None,
            api_key: None,
            query_instruction: default_query_instruction(),
            normalize: false,
            model_path: None,
        }
    }
}

fn default_embedding_provider() -> String {
    "ollama".to_string()
}

impl EmbeddingConfig {
    /// The configured model, or the provider's default
    pub fn model_name(&self) -> String {
        match &self.model {
            Some(model) => model.clone(),
            None => default_embedding_model(&self.provider).to_string(),
        }
    }
}

/// Default embedding model for a provider
///
/// `local` loads the checkpoint LangChain-populated collections were built
/// with; Ollama has no tag serving those exact weights.
pub fn default_embedding_model(provider: &str) -> &'static str {
    match provider {
        "local" => REFERENCE_EMBEDDING_MODEL,
        "openai" => "text-embedding-3-small",
        _ => "bge-large",
    }
}

fn default_query_instruction() -> String {
    BGE_QUERY.to_string()
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Provider type: ollama, openai, simulated
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Host for Ollama
    pub host: Option<String>,

    /// Base URL for OpenAI-compatible APIs
    pub base_url: Option<String>,

    /// API key for OpenAI
    pub api_key: Option<String>,

    /// Completion length cap for chat-completion providers
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            temperature: default_temperature(),
            host: None,
            base_url: None,
            api_key: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_llm_provider() -> String {
    "ollama".to_string()
}

fn default_llm_model() -> String {
    "llama2".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    1000
}

/// Qdrant connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorStoreConfig {
    /// Qdrant REST endpoint
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Collection holding the pre-populated chunks
    #[serde(default = "default_collection")]
    pub collection: String,

    /// API key for Qdrant Cloud
    pub api_key: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            collection: default_collection(),
            api_key: None,
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "vector_db".to_string()
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of chunks fetched per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Replacement answering prompt with `{context}` and `{question}`
    pub prompt_template: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            prompt_template: None,
        }
    }
}

fn default_top_k() -> usize {
    crate::rag::DEFAULT_TOP_K
}

/// Ingestion (splitting) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters carried over between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Separator the text is split on before merging
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Embedding batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separator: default_separator(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_separator() -> String {
    "\n\n".to_string()
}

fn default_batch_size() -> usize {
    32
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8501
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Request timeout in seconds for every backend call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("devchat")
            .join("config.toml")
    }

    /// Load config from file, returning defaults if not found
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config file: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Write the example config, replacing any existing file when `force` is set
    ///
    /// Returns `false` if a file already existed and was left alone.
    pub fn write_example(force: bool) -> anyhow::Result<bool> {
        let path = Self::config_path();
        if path.exists() && !force {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, EXAMPLE_CONFIG)?;
        Ok(true)
    }
}

const EXAMPLE_CONFIG: &str = r#"# devchat configuration
# Location: ~/.config/devchat/config.toml

[embedding]
# Provider: ollama, openai, local (requires the local-embeddings feature)
provider = "ollama"

# Must match the model the collection was populated with. Defaults:
#   ollama -> bge-large (BGE v1.5; differs from collections built with BAAI/bge-large-en)
#   local  -> BAAI/bge-large-en
#   openai -> text-embedding-3-small
# model = "bge-large"

# host = "http://localhost:11434"
# base_url = "https://api.openai.com/v1"
# api_key = "sk-..."

# Prefix prepended to questions before embedding ("" disables it)
query_instruction = "Represent this question for searching relevant passages: "

# L2-normalize local embeddings
normalize = false

[llm]
# Provider: ollama, openai, simulated
provider = "ollama"
model = "llama2"
temperature = 0.5
# max_tokens = 1000

[vector_store]
url = "http://localhost:6333"
collection = "vector_db"
# api_key = "..."

[retrieval]
top_k = 3
# prompt_template = """Use the context to answer.
# {context}
# Q: {question}
# """

[ingest]
chunk_size = 1000
chunk_overlap = 100
separator = "\n\n"
batch_size = 32

[server]
host = "127.0.0.1"
port = 8501

[http]
timeout_secs = 120
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.llm.model, "llama2");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.vector_store.url, "http://localhost:6333");
        assert_eq!(config.vector_store.collection, "vector_db");
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[llm]
model = "mistral"

[vector_store]
collection = "docs"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.vector_store.collection, "docs");
        assert_eq!(config.vector_store.url, "http://localhost:6333");
        assert_eq!(config.embedding.query_instruction, BGE_QUERY);
        assert_eq!(config.retrieval.prompt_template, None);
    }

    #[test]
    fn test_embedding_model_defaults_per_provider() {
        let mut config = EmbeddingConfig::default();
        assert_eq!(config.model_name(), "bge-large");

        config.provider = "local".to_string();
        assert_eq!(config.model_name(), "BAAI/bge-large-en");

        config.provider = "openai".to_string();
        assert_eq!(config.model_name(), "text-embedding-3-small");

        config.model = Some("nomic-embed-text".to_string());
        assert_eq!(config.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_local_provider_without_model_uses_hub_id() {
        let config: Config = toml::from_str("[embedding]\nprovider = \"local\"\n").unwrap();
        assert_eq!(config.embedding.model, None);
        assert_eq!(config.embedding.model_name(), "BAAI/bge-large-en");
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }
}
