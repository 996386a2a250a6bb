//! Command-line and environment overrides of the config file

use clap::Args;

use crate::config::Config;

/// Backend settings shared by every command that talks to a backend
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// LLM provider
    #[arg(long, value_parser = ["ollama", "openai", "simulated"])]
    pub llm: Option<String>,

    /// LLM model name
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Embedding provider
    #[arg(long, value_parser = ["ollama", "openai", "local"])]
    pub embedding_provider: Option<String>,

    /// Embedding model name (must match the collection's vectors)
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Ollama host for both embeddings and generation
    #[arg(long, env = "OLLAMA_HOST")]
    pub ollama_host: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub api_base: Option<String>,

    /// Qdrant REST URL
    #[arg(long, env = "QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    pub qdrant_api_key: Option<String>,

    /// Collection name
    #[arg(long)]
    pub collection: Option<String>,

    /// Number of chunks to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,
}

impl BackendArgs {
    /// Overlay the given flags on `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(llm) = &self.llm {
            config.llm.provider = llm.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(provider) = &self.embedding_provider {
            config.embedding.provider = provider.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.embedding.model = Some(model.clone());
        }
        if let Some(host) = &self.ollama_host {
            config.embedding.host = Some(host.clone());
            config.llm.host = Some(host.clone());
        }
        if let Some(key) = &self.api_key {
            config.embedding.api_key = Some(key.clone());
            config.llm.api_key = Some(key.clone());
        }
        if let Some(base) = &self.api_base {
            config.embedding.base_url = Some(base.clone());
            config.llm.base_url = Some(base.clone());
        }
        if let Some(url) = &self.qdrant_url {
            config.vector_store.url = url.clone();
        }
        if let Some(key) = &self.qdrant_api_key {
            config.vector_store.api_key = Some(key.clone());
        }
        if let Some(collection) = &self.collection {
            config.vector_store.collection = collection.clone();
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
    }

    /// Load the config file and apply the overrides
    pub fn resolve(&self) -> Config {
        let mut config = Config::load();
        self.apply(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        BackendArgs::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_override() {
        let args = BackendArgs {
            llm: Some("simulated".to_string()),
            temperature: Some(0.1),
            ollama_host: Some("http://gpu-box:11434".to_string()),
            collection: Some("rust_docs".to_string()),
            top_k: Some(5),
            ..Default::default()
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.llm.provider, "simulated");
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.llm.host.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.embedding.host.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.vector_store.collection, "rust_docs");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.model, "llama2");
    }
}
