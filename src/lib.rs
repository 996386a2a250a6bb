//! devchat - retrieval-augmented chatbot for developers
//!
//! Embeds a question, fetches the nearest chunks from a Qdrant collection,
//! asks a language model to answer from them and keeps only the sentences
//! that mention the question's words.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod http;
pub mod llm;
pub mod loader;
pub mod rag;
pub mod store;
