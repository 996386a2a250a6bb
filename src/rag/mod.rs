//! RAG module - retrieval, prompting and answer filtering
//!
//! The answering flow is `Retriever` → `PromptTemplate` → `LanguageModel`
//! → `keyword_filter`, wired together by `AnswerPipeline`.

mod cache;
mod filter;
mod pipeline;
mod prompt;
mod retriever;

pub use cache::{PipelineCache, PipelineKey};
pub use filter::{keyword_filter, FALLBACK_ANSWER};
pub use pipeline::AnswerPipeline;
pub use prompt::{PromptTemplate, ANSWER_TEMPLATE, CONTEXT_SEPARATOR};
pub use retriever::Retriever;

/// Chunks fetched per question
pub const DEFAULT_TOP_K: usize = 3;
