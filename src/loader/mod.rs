//! Document loaders - web pages and local files
//!
//! Loaders only produce text plus metadata; splitting and embedding happen
//! in `ingest`.

mod files;
mod web;

pub use files::{load_paths, DEFAULT_EXTENSIONS};
pub use web::{html_to_text, WebLoader};

/// Loaded text with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub metadata: serde_json::Value,
}

impl Document {
    pub fn new(text: impl Into<String>, source: &str) -> Self {
        Self {
            text: text.into(),
            metadata: serde_json::json!({ "source": source }),
        }
    }
}
