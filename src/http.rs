//! HTTP utilities for backend clients

use std::time::Duration;

use reqwest::{Client, Response};

/// Default request timeout when the config does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create a reqwest client with connection pooling and sensible defaults
///
/// The client is configured with:
/// - Connection pooling (max 10 idle connections per host)
/// - A request timeout of `timeout_secs` (LLM generation can be slow)
/// - 30 second connect timeout
pub fn create_client(timeout_secs: u64) -> Client {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

/// Check HTTP response status and return detailed error if not successful
///
/// This helper extracts error details from the response body for better debugging.
pub async fn check_response(response: Response, service_name: &str) -> anyhow::Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    anyhow::bail!("{} API error {}: {}", service_name, status, error_detail(body))
}

/// Pull a human-readable message out of an error body
///
/// Understands the shapes used by OpenAI (`error.message`), Ollama (`error`)
/// and Qdrant (`status.error`); anything else is returned verbatim.
pub fn error_detail(body: String) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) else {
        return body;
    };

    json.get("error")
        .and_then(|e| e.get("message").and_then(|m| m.as_str()).or_else(|| e.as_str()))
        .or_else(|| json.get("status").and_then(|s| s.get("error")).and_then(|e| e.as_str()))
        .or_else(|| json.get("message").and_then(|m| m.as_str()))
        .or_else(|| json.get("detail").and_then(|d| d.as_str()))
        .map(|s| s.to_string())
        .unwrap_or(body)
}
