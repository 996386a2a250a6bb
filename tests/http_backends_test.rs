//! Answer pipeline built from config, against HTTP backends served locally

use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devchat::config::Config;
use devchat::embedding::templates::BGE_QUERY;
use devchat::rag::{AnswerPipeline, FALLBACK_ANSWER};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.embedding.host = Some(server.uri());
    config.llm.host = Some(server.uri());
    config.vector_store.url = server.uri();
    config
}

async fn mount_embed_and_search(server: &MockServer, question: &str) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(serde_json::json!({
            "model": "bge-large",
            "input": [format!("{}{}", BGE_QUERY, question)]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[0.6, 0.8]]})),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/vector_db/points/search"))
        .and(body_partial_json(serde_json::json!({"limit": 3, "with_payload": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [
                {"id": "a", "score": 0.9, "payload": {"page_content": "Python is great."}},
                {"id": "b", "score": 0.8, "payload": {"page_content": "Go is fast."}},
                {"id": "c", "score": 0.7, "payload": {"page_content": "Rust is safe."}}
            ],
            "status": "ok",
            "time": 0.001
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_generate(server: &MockServer, prompt: &str, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(serde_json::json!({
            "model": "llama2",
            "prompt": prompt,
            "stream": false,
            "options": {"temperature": 0.5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama2",
            "response": answer,
            "done": true
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_default_pipeline_over_http() {
    let server = MockServer::start().await;
    mount_embed_and_search(&server, "python speed").await;
    mount_generate(
        &server,
        "Answer the question based only on the following context:\n\
         Python is great.\n\nGo is fast.\n\nRust is safe.\n\
         Question: python speed\n",
        "Python is great. Go is fast.",
    )
    .await;

    let pipeline = AnswerPipeline::from_config(&config_for(&server)).unwrap();
    assert_eq!(pipeline.answer("python speed").await.unwrap(), "Python is great.");
}

#[tokio::test]
async fn test_unrelated_answer_over_http_falls_back() {
    let server = MockServer::start().await;
    mount_embed_and_search(&server, "rust performance").await;
    mount_generate(
        &server,
        "Answer the question based only on the following context:\n\
         Python is great.\n\nGo is fast.\n\nRust is safe.\n\
         Question: rust performance\n",
        "Cats are cute.",
    )
    .await;

    let pipeline = AnswerPipeline::from_config(&config_for(&server)).unwrap();
    assert_eq!(pipeline.answer("rust performance").await.unwrap(), FALLBACK_ANSWER);
}

#[tokio::test]
async fn test_missing_collection_surfaces_before_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[0.6, 0.8]]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/vector_db/points/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = AnswerPipeline::from_config(&config_for(&server)).unwrap();
    let err = pipeline.answer("anything").await.unwrap_err();
    assert!(err.to_string().contains("vector_db"));
}
