//! Qdrant REST client
//!
//! Talks to Qdrant's HTTP API on port 6333. Points follow the LangChain
//! layout: chunk text under `page_content`, loader metadata under `metadata`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{HttpConfig, VectorStoreConfig};
use crate::embedding::REFERENCE_EMBEDDING_MODEL;
use crate::http::{create_client, error_detail};

use super::{Chunk, VectorIndex};

/// Payload key holding the chunk text
pub const CONTENT_KEY: &str = "page_content";
/// Payload key holding loader metadata
pub const METADATA_KEY: &str = "metadata";
/// Metadata key naming the model a point was embedded with
pub const EMBEDDING_MODEL_KEY: &str = "embedding_model";

/// Errors reported by the Qdrant client
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Qdrant API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("collection '{0}' does not exist")]
    MissingCollection(String),

    #[error("point {0} has no 'page_content' payload")]
    MissingContent(String),
}

/// Collection summary returned by `GET /collections/{name}`
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub status: String,
    pub points_count: u64,
    pub vector_size: Option<u64>,
    pub distance: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Serialize)]
struct ScrollRequest {
    limit: usize,
    with_payload: bool,
    with_vector: bool,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrolledPoint>,
}

#[derive(Deserialize)]
struct ScrolledPoint {
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct CollectionResult {
    status: String,
    #[serde(default)]
    points_count: Option<u64>,
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    #[serde(default)]
    vectors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ExistsResult {
    exists: bool,
}

/// A point to upsert
#[derive(Debug, Serialize)]
pub struct NewPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: serde_json::Value,
}

/// Handle to one Qdrant collection
pub struct QdrantStore {
    client: Client,
    url: String,
    collection: String,
    api_key: Option<String>,
}

impl QdrantStore {
    /// Create a handle for `collection` on the Qdrant at `url`
    pub fn new(url: &str, collection: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let url = url.trim_end_matches('/').to_string();
        info!("Qdrant collection '{}' @ {}", collection, url);

        Self {
            client: create_client(timeout_secs),
            url,
            collection: collection.to_string(),
            api_key,
        }
    }

    /// Create the handle described by the `[vector_store]` config section
    pub fn from_config(config: &VectorStoreConfig, http: &HttpConfig) -> Self {
        Self::new(
            &config.url,
            &config.collection,
            config.api_key.clone(),
            http.timeout_secs,
        )
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/collections/{}{}", self.url, self.collection, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    async fn check(&self, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::MissingCollection(self.collection.clone()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status,
            message: error_detail(body),
        })
    }

    /// Whether the collection exists
    pub async fn collection_exists(&self) -> anyhow::Result<bool> {
        let response = self
            .authorize(self.client.get(self.endpoint("/exists")))
            .send()
            .await?;
        let response = self.check(response).await?;
        let envelope: Envelope<ExistsResult> = response.json().await?;
        Ok(envelope.result.exists)
    }

    /// Fetch status, point count and vector parameters
    pub async fn collection_info(&self) -> anyhow::Result<CollectionInfo> {
        let response = self
            .authorize(self.client.get(self.endpoint("")))
            .send()
            .await?;
        let response = self.check(response).await?;
        let envelope: Envelope<CollectionResult> = response.json().await?;
        Ok(collection_info_from(envelope.result))
    }

    /// Create the collection with cosine distance if it does not exist yet
    pub async fn ensure_collection(&self, vector_size: usize) -> anyhow::Result<()> {
        if self.collection_exists().await? {
            return Ok(());
        }

        info!(
            "Creating collection '{}' ({} dims, cosine)",
            self.collection, vector_size
        );
        let body = serde_json::json!({
            "vectors": { "size": vector_size, "distance": "Cosine" }
        });
        let response = self
            .authorize(self.client.put(self.endpoint("")))
            .json(&body)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    /// Model recorded on an arbitrary point, `None` for an empty collection
    ///
    /// Points written without a record (LangChain's loader) report
    /// [`REFERENCE_EMBEDDING_MODEL`].
    pub async fn recorded_embedding_model(&self) -> anyhow::Result<Option<String>> {
        let request = ScrollRequest {
            limit: 1,
            with_payload: true,
            with_vector: false,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("/points/scroll")))
            .json(&request)
            .send()
            .await?;
        let response = self.check(response).await?;
        let envelope: Envelope<ScrollResult> = response.json().await?;

        Ok(envelope
            .result
            .points
            .into_iter()
            .next()
            .map(|point| recorded_model(point.payload.as_ref())))
    }

    /// Warning text when `model` differs from the one the collection was built with
    pub async fn embedding_model_warning(&self, model: &str) -> anyhow::Result<Option<String>> {
        let recorded = self.recorded_embedding_model().await?;
        Ok(recorded.filter(|r| r != model).map(|r| {
            format!(
                "Collection '{}' was embedded with '{}' but questions are embedded with '{}'; \
                 retrieval quality will suffer. Set [embedding] provider/model to match.",
                self.collection, r, model
            )
        }))
    }

    /// Insert or replace points, waiting until they are searchable
    pub async fn upsert(&self, points: Vec<NewPoint>) -> anyhow::Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let count = points.len();
        let response = self
            .authorize(self.client.put(self.endpoint("/points?wait=true")))
            .json(&serde_json::json!({ "points": points }))
            .send()
            .await?;
        self.check(response).await?;
        debug!("Upserted {} points", count);
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn search(&self, vector: &[f32], k: usize) -> anyhow::Result<Vec<Chunk>> {
        let request = SearchRequest {
            vector,
            limit: k,
            with_payload: true,
        };

        let response = self
            .authorize(self.client.post(self.endpoint("/points/search")))
            .json(&request)
            .send()
            .await?;
        let response = self.check(response).await?;
        let envelope: Envelope<Vec<ScoredPoint>> = response.json().await?;

        let chunks = envelope
            .result
            .into_iter()
            .map(chunk_from_point)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks)
    }
}

fn point_id(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn chunk_from_point(point: ScoredPoint) -> Result<Chunk, StoreError> {
    let id = point_id(&point.id);
    let mut payload = point.payload.unwrap_or_default();

    let text = match payload.remove(CONTENT_KEY) {
        Some(serde_json::Value::String(s)) => s,
        _ => return Err(StoreError::MissingContent(id)),
    };
    let metadata = payload
        .remove(METADATA_KEY)
        .unwrap_or(serde_json::Value::Null);

    Ok(Chunk {
        id,
        score: point.score,
        text,
        metadata,
    })
}

fn recorded_model(payload: Option<&serde_json::Map<String, serde_json::Value>>) -> String {
    payload
        .and_then(|p| p.get(METADATA_KEY))
        .and_then(|m| m.get(EMBEDDING_MODEL_KEY))
        .and_then(|m| m.as_str())
        .unwrap_or(REFERENCE_EMBEDDING_MODEL)
        .to_string()
}

fn collection_info_from(result: CollectionResult) -> CollectionInfo {
    // Unnamed vectors are `{size, distance}`; named vectors nest one level deeper
    let params = result.config.params.vectors.unwrap_or_default();
    let vector_size = params.get("size").and_then(|s| s.as_u64());
    let distance = params
        .get("distance")
        .and_then(|d| d.as_str())
        .map(|d| d.to_string());

    CollectionInfo {
        status: result.status,
        points_count: result.points_count.unwrap_or(0),
        vector_size,
        distance,
    }
}
