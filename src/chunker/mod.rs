//! Chunking module - split loaded documents before embedding

mod character;

pub use character::CharacterSplitter;

use crate::loader::Document;

/// A piece of a document, ready to embed
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub metadata: serde_json::Value,
}

impl CharacterSplitter {
    /// Split every document, tagging chunks with the document metadata
    /// plus a `chunk_index`
    pub fn split_documents(&self, documents: &[Document]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            for (i, text) in self.split_text(&doc.text).into_iter().enumerate() {
                let mut metadata = doc.metadata.clone();
                if let Some(obj) = metadata.as_object_mut() {
                    obj.insert("chunk_index".to_string(), i.into());
                }
                chunks.push(TextChunk { text, metadata });
            }
        }

        chunks
    }
}
