//! End-to-end answer pipeline over in-memory backends

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use devchat::embedding::Embedder;
use devchat::llm::{LanguageModel, LlmProvider, LlmType};
use devchat::rag::{AnswerPipeline, PromptTemplate, Retriever, FALLBACK_ANSWER};
use devchat::store::{Chunk, VectorIndex};

/// Two-dimensional bag of words: counts of "rust" and "python"
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                vec![t.matches("rust").count() as f32, t.matches("python").count() as f32]
            })
            .collect())
    }
}

/// Brute-force dot-product index
struct MemoryIndex {
    entries: Vec<(Vec<f32>, &'static str)>,
    requests: Mutex<Vec<usize>>,
}

impl MemoryIndex {
    fn new(entries: Vec<(Vec<f32>, &'static str)>) -> Self {
        Self {
            entries,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn search(&self, vector: &[f32], k: usize) -> anyhow::Result<Vec<Chunk>> {
        self.requests.lock().unwrap().push(k);

        let mut scored: Vec<Chunk> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (v, text))| Chunk {
                id: i.to_string(),
                score: v.iter().zip(vector).map(|(a, b)| a * b).sum(),
                text: text.to_string(),
                metadata: serde_json::json!({ "source": format!("doc-{}", i) }),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

struct FixedAnswer(&'static str);

#[async_trait]
impl LanguageModel for FixedAnswer {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.to_string())
    }
}

fn corpus() -> Arc<MemoryIndex> {
    Arc::new(MemoryIndex::new(vec![
        (vec![1.0, 0.0], "Rust guarantees memory safety without a GC."),
        (vec![0.0, 1.0], "Python is great for scripting."),
        (vec![2.0, 0.0], "Rust ownership moves values between bindings."),
        (vec![0.0, 0.0], "Cats are cute."),
        (vec![1.0, 1.0], "Rust and Python interoperate through PyO3."),
    ]))
}

fn simulated() -> Arc<LlmProvider> {
    Arc::new(LlmProvider::new("llama2".to_string(), 0.5, LlmType::Simulated).unwrap())
}

#[tokio::test]
async fn test_filter_keeps_only_matching_sentences() {
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), corpus());
    let pipeline = AnswerPipeline::new(retriever, Arc::new(FixedAnswer("Python is great. Go is fast.")));

    let answer = pipeline.answer("python speed").await.unwrap();
    assert_eq!(answer, "Python is great.");
}

#[tokio::test]
async fn test_irrelevant_answer_falls_back() {
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), corpus());
    let pipeline = AnswerPipeline::new(retriever, Arc::new(FixedAnswer("Cats are cute.")));

    let answer = pipeline.answer("rust performance").await.unwrap();
    assert_eq!(answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn test_retrieves_three_nearest_chunks() {
    let index = corpus();
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), index.clone());

    let chunks = retriever.retrieve("how does rust ownership work").await.unwrap();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Rust ownership moves values between bindings.",
            "Rust guarantees memory safety without a GC.",
            "Rust and Python interoperate through PyO3.",
        ]
    );
    assert_eq!(chunks[0].source(), Some("doc-2"));
    assert_eq!(*index.requests.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_simulated_model_answers_from_context() {
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), corpus());
    let pipeline = AnswerPipeline::new(retriever, simulated());

    let answer = pipeline.answer("python").await.unwrap();
    assert_eq!(
        answer,
        "Python is great for scripting. Rust and Python interoperate through PyO3."
    );
}

#[tokio::test]
async fn test_custom_prompt_reaches_model() {
    struct Recorder(Mutex<Option<String>>);

    #[async_trait]
    impl LanguageModel for Recorder {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            *self.0.lock().unwrap() = Some(prompt.to_string());
            Ok("Rust is fine.".to_string())
        }
    }

    let recorder = Arc::new(Recorder(Mutex::new(None)));
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), corpus()).with_top_k(1);
    let pipeline = AnswerPipeline::new(retriever, recorder.clone())
        .with_prompt(PromptTemplate::new("CTX[{context}] Q[{question}]"));

    let answer = pipeline.answer("rust").await.unwrap();
    assert_eq!(answer, "Rust is fine.");
    assert_eq!(
        recorder.0.lock().unwrap().as_deref(),
        Some("CTX[Rust ownership moves values between bindings.] Q[rust]")
    );
}
