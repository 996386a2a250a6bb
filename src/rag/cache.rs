//! Pipeline cache keyed by the settings the pipeline was built from
//!
//! Long-running front ends (interactive `ask`, `serve`) re-read the config
//! for each question; the cached pipeline is reused while the key is
//! unchanged and rebuilt as soon as any relevant setting differs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::info;

use crate::config::Config;

use super::AnswerPipeline;

/// Stable fingerprint of the settings that shape a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey(u64);

impl PipelineKey {
    /// Hash the embedding, LLM, vector store, retrieval and HTTP sections
    ///
    /// Ingest and server settings do not affect answering and are left out.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let relevant = serde_json::to_string(&(
            &config.embedding,
            &config.llm,
            &config.vector_store,
            &config.retrieval,
            &config.http,
        ))?;

        let mut hasher = DefaultHasher::new();
        relevant.hash(&mut hasher);
        Ok(Self(hasher.finish()))
    }
}

/// Holds at most one built pipeline together with its key
#[derive(Default)]
pub struct PipelineCache {
    entry: Option<(PipelineKey, Arc<AnswerPipeline>)>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pipeline for `key`, building it on a miss
    ///
    /// A failed build leaves the cache empty, so the next call retries.
    pub fn get_or_try_insert<F>(&mut self, key: PipelineKey, build: F) -> anyhow::Result<Arc<AnswerPipeline>>
    where
        F: FnOnce() -> anyhow::Result<AnswerPipeline>,
    {
        if let Some((cached, pipeline)) = &self.entry {
            if *cached == key {
                return Ok(pipeline.clone());
            }
            info!("Settings changed, rebuilding pipeline");
        }

        self.entry = None;
        let pipeline = Arc::new(build()?);
        self.entry = Some((key, pipeline.clone()));
        Ok(pipeline)
    }

    /// Build (or reuse) the pipeline described by `config`
    pub fn get_for_config(&mut self, config: &Config) -> anyhow::Result<Arc<AnswerPipeline>> {
        let key = PipelineKey::from_config(config)?;
        self.get_or_try_insert(key, || AnswerPipeline::from_config(config))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn key(&self) -> Option<PipelineKey> {
        self.entry.as_ref().map(|(key, _)| *key)
    }
}
