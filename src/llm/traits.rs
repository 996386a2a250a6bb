//! Language model traits

use async_trait::async_trait;

/// A text-completion backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` in one non-streaming call
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
