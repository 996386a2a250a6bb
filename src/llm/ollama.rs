//! Ollama LLM provider

use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{check_response, create_client};

/// Ollama LLM provider
pub struct OllamaLlm {
    client: Client,
    host: String,
    model_name: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider
    pub fn new(
        model_name: String,
        temperature: f32,
        host: Option<String>,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let host = host
            .or_else(|| env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        info!("Ollama LLM provider: {} @ {}", model_name, host);

        Ok(Self {
            client: create_client(timeout_secs),
            host,
            model_name,
            temperature,
        })
    }

    /// Generate a response
    pub async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let request = GenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&request)
            .send()
            .await?;

        let response = check_response(response, "Ollama").await?;
        let text = response.text().await?;

        let answer = collect_generate_lines(&text)?;
        debug!("Ollama returned {} chars", answer.len());
        Ok(answer)
    }
}

/// Concatenate the `response` fields of one or more JSON lines
///
/// With `stream: false` Ollama sends a single object, but proxies in front of
/// it sometimes force streaming, so newline-delimited objects are accepted too.
fn collect_generate_lines(body: &str) -> anyhow::Result<String> {
    let mut full_response = String::new();
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let resp: GenerateResponse = serde_json::from_str(line)?;
        full_response.push_str(&resp.response);
        if resp.done {
            break;
        }
    }
    Ok(full_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_temperature() {
        let request = GenerateRequest {
            model: "llama2",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.5);
    }

    #[test]
    fn test_single_object_body() {
        let body = r#"{"model":"llama2","response":"Rust is fast.","done":true}"#;
        assert_eq!(collect_generate_lines(body).unwrap(), "Rust is fast.");
    }

    #[test]
    fn test_streamed_body() {
        let body = "{\"response\":\"Rust \",\"done\":false}\n{\"response\":\"is fast.\",\"done\":true}\n";
        assert_eq!(collect_generate_lines(body).unwrap(), "Rust is fast.");
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(collect_generate_lines("<html>bad gateway</html>").is_err());
    }

    #[tokio::test]
    async fn test_generate_sends_model_temperature_and_no_stream() {
        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(serde_json::json!({
                "model": "llama2",
                "prompt": "Question: why rust",
                "stream": false,
                "options": {"temperature": 0.5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama2",
                "response": "Rust is memory safe.",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = OllamaLlm::new("llama2".to_string(), 0.5, Some(server.uri()), 5).unwrap();
        assert_eq!(llm.generate("Question: why rust").await.unwrap(), "Rust is memory safe.");
    }

    #[tokio::test]
    async fn test_generate_error_carries_ollama_message() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model \"llama2\" not found, try pulling it first"})),
            )
            .mount(&server)
            .await;

        let llm = OllamaLlm::new("llama2".to_string(), 0.5, Some(server.uri()), 5).unwrap();
        let err = llm.generate("hi").await.unwrap_err().to_string();
        assert!(err.contains("404"));
        assert!(err.contains("try pulling it first"));
    }
}
