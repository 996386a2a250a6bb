//! Vector store module - read access to the pre-populated collection,
//! plus the write path used by `ingest`

mod qdrant;
mod traits;

pub use qdrant::{
    CollectionInfo, NewPoint, QdrantStore, StoreError, CONTENT_KEY, EMBEDDING_MODEL_KEY, METADATA_KEY,
};
pub use traits::VectorIndex;

use serde::Serialize;

/// A retrieved text chunk, in relevance order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub metadata: serde_json::Value,
}

impl Chunk {
    /// Chunk with no id, score or metadata (mocks and tests)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            score: 0.0,
            text: text.into(),
            metadata: serde_json::Value::Null,
        }
    }

    /// The `source` metadata field, if the loader recorded one
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(|s| s.as_str())
    }
}
