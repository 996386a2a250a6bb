//! Token truncation for chunks sent to the embedding backend

use tiktoken_rs::cl100k_base;
use tracing::warn;

/// Input token limit of an embedding model
///
/// BERT-family models (BGE, MiniLM, mxbai) accept 512 positions; the counts
/// are approximate since cl100k tokens are not the model's own wordpieces.
pub fn get_token_limit(model_name: &str) -> usize {
    let base_name = model_name
        .split(':')
        .next()
        .unwrap_or(model_name)
        .rsplit('/')
        .next()
        .unwrap_or(model_name);

    match base_name {
        "text-embedding-3-small" | "text-embedding-3-large" | "text-embedding-ada-002" => 8192,
        "bge-m3" => 8192,
        "nomic-embed-text" | "nomic-embed-text-v1.5" => 2048,
        name if name.starts_with("bge-") => 512,
        "mxbai-embed-large" | "all-minilm" | "snowflake-arctic-embed" => 512,
        _ => 512,
    }
}

/// Truncate texts to fit within token limit
pub fn truncate_to_token_limit(texts: &[String], token_limit: usize) -> anyhow::Result<Vec<String>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let bpe = cl100k_base()?;

    let mut truncated = Vec::with_capacity(texts.len());
    let mut truncation_count = 0;

    for (i, text) in texts.iter().enumerate() {
        let tokens = bpe.encode_with_special_tokens(text);
        let original_length = tokens.len();

        if original_length <= token_limit {
            truncated.push(text.clone());
            continue;
        }

        let kept: Vec<_> = tokens.into_iter().take(token_limit).collect();
        let truncated_text = match bpe.decode(kept) {
            Ok(s) => s,
            // Cut on a char boundary near 4 bytes per token
            Err(_) => text.chars().take(token_limit * 4).collect(),
        };
        truncated.push(truncated_text);

        truncation_count += 1;
        if truncation_count <= 3 {
            warn!(
                "Chunk {} truncated: {} → {} tokens",
                i + 1,
                original_length,
                token_limit
            );
        }
    }

    if truncation_count > 3 {
        warn!(
            "Truncation summary: {}/{} chunks truncated",
            truncation_count,
            texts.len()
        );
    }

    Ok(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_limit_lookup() {
        assert_eq!(get_token_limit("text-embedding-3-small"), 8192);
        assert_eq!(get_token_limit("bge-large"), 512);
        assert_eq!(get_token_limit("BAAI/bge-large-en"), 512);
        assert_eq!(get_token_limit("nomic-embed-text:latest"), 2048);
        assert_eq!(get_token_limit("unknown-model"), 512);
    }

    #[test]
    fn test_short_text_untouched() {
        let short_text = "Hello world".to_string();
        let result = truncate_to_token_limit(&[short_text.clone()], 100).unwrap();
        assert_eq!(result[0], short_text);
    }

    #[test]
    fn test_long_text_truncated() {
        let long_text = "word ".repeat(2000);
        let result = truncate_to_token_limit(&[long_text.clone()], 50).unwrap();
        assert!(result[0].len() < long_text.len());
        assert!(result[0].starts_with("word word"));
    }
}
