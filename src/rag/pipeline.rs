//! Answer pipeline - question in, filtered answer out

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::llm::{LanguageModel, LlmProvider};
use crate::store::Chunk;

use super::filter::keyword_filter;
use super::prompt::PromptTemplate;
use super::retriever::Retriever;

/// Retriever, prompt, model and keyword filter composed into one call
#[derive(Clone)]
pub struct AnswerPipeline {
    retriever: Retriever,
    prompt: PromptTemplate,
    llm: Arc<dyn LanguageModel>,
}

impl AnswerPipeline {
    pub fn new(retriever: Retriever, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            retriever,
            prompt: PromptTemplate::default(),
            llm,
        }
    }

    /// Wire the configured retriever and LLM
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let retriever = Retriever::from_config(config)?;
        let llm = LlmProvider::from_config(&config.llm, &config.http)?;

        let mut pipeline = Self::new(retriever, Arc::new(llm));
        if let Some(template) = &config.retrieval.prompt_template {
            let prompt = PromptTemplate::new(template.as_str());
            prompt.validate()?;
            pipeline = pipeline.with_prompt(prompt);
        }
        Ok(pipeline)
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Retrieve context and return the model's unfiltered answer with it
    pub async fn raw_answer(&self, question: &str) -> anyhow::Result<(String, Vec<Chunk>)> {
        let chunks = self.retriever.retrieve(question).await?;
        let prompt = self.prompt.format(&chunks, question);
        debug!("Prompt is {} chars", prompt.len());

        let answer = self.llm.complete(&prompt).await?;
        Ok((answer, chunks))
    }

    /// Answer `question`, keeping only sentences that mention its words
    ///
    /// Backend failures are returned as-is; the only local recovery is the
    /// fallback string produced by the keyword filter.
    pub async fn answer(&self, question: &str) -> anyhow::Result<String> {
        let (raw, chunks) = self.raw_answer(question).await?;
        let filtered = keyword_filter(&raw, question);

        info!(
            "Answered from {} chunks ({} → {} chars)",
            chunks.len(),
            raw.len(),
            filtered.len()
        );
        Ok(filtered)
    }
}
