//! LLM module - language model providers for RAG

mod ollama;
mod openai;
mod simulated;
mod traits;

pub use traits::LanguageModel;

use async_trait::async_trait;
use tracing::info;

use crate::config::{HttpConfig, LlmConfig};

/// LLM provider type
#[derive(Debug, Clone)]
pub enum LlmType {
    Ollama { host: Option<String>, timeout_secs: u64 },
    OpenAI { api_key: Option<String>, base_url: Option<String>, max_tokens: u32 },
    Simulated,
}

impl LlmType {
    /// Resolve the provider named by `[llm] provider`
    pub fn from_config(config: &LlmConfig, http: &HttpConfig) -> anyhow::Result<Self> {
        match config.provider.as_str() {
            "ollama" => Ok(Self::Ollama {
                host: config.host.clone(),
                timeout_secs: http.timeout_secs,
            }),
            "openai" => Ok(Self::OpenAI {
                api_key: config.api_key.clone(),
                base_url: config.base_url.clone(),
                max_tokens: config.max_tokens,
            }),
            "simulated" => Ok(Self::Simulated),
            other => anyhow::bail!("Unknown LLM provider: {}", other),
        }
    }
}

/// Unified LLM provider
pub struct LlmProvider {
    model_name: String,
    temperature: f32,
    inner: LlmProviderInner,
}

enum LlmProviderInner {
    Ollama(ollama::OllamaLlm),
    OpenAI(openai::OpenAILlm),
    Simulated(simulated::SimulatedLlm),
}

impl LlmProvider {
    /// Create a new LLM provider
    pub fn new(model_name: String, temperature: f32, llm_type: LlmType) -> anyhow::Result<Self> {
        let inner = match llm_type {
            LlmType::Ollama { host, timeout_secs } => LlmProviderInner::Ollama(
                ollama::OllamaLlm::new(model_name.clone(), temperature, host, timeout_secs)?,
            ),
            LlmType::OpenAI { api_key, base_url, max_tokens } => LlmProviderInner::OpenAI(
                openai::OpenAILlm::new(model_name.clone(), temperature, max_tokens, api_key, base_url)?,
            ),
            LlmType::Simulated => {
                LlmProviderInner::Simulated(simulated::SimulatedLlm::new(model_name.clone()))
            }
        };

        info!(
            "Initialized LLM provider: {} (temperature {})",
            model_name, temperature
        );

        Ok(Self {
            model_name,
            temperature,
            inner,
        })
    }

    /// Create the provider described by the `[llm]` config section
    pub fn from_config(config: &LlmConfig, http: &HttpConfig) -> anyhow::Result<Self> {
        let llm_type = LlmType::from_config(config, http)?;
        Self::new(config.model.clone(), config.temperature, llm_type)
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

#[async_trait]
impl LanguageModel for LlmProvider {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        match &self.inner {
            LlmProviderInner::Ollama(llm) => llm.generate(prompt).await,
            LlmProviderInner::OpenAI(llm) => llm.generate(prompt).await,
            LlmProviderInner::Simulated(llm) => Ok(llm.generate(prompt)),
        }
    }
}
