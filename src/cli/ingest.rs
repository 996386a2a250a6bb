//! Ingest command - load, split, embed and upsert documents

use std::path::PathBuf;

use clap::Args;
use futures::future::try_join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::chunker::{CharacterSplitter, TextChunk};
use crate::embedding::{get_token_limit, truncate_to_token_limit, Embedder, EmbeddingProvider};
use crate::loader::{load_paths, Document, WebLoader, DEFAULT_EXTENSIONS};
use crate::store::{NewPoint, QdrantStore, CONTENT_KEY, EMBEDDING_MODEL_KEY, METADATA_KEY};

use super::BackendArgs;

#[derive(Args)]
pub struct IngestArgs {
    /// Web pages to load
    #[arg(long)]
    pub url: Vec<String>,

    /// Document directories and/or files
    #[arg(long)]
    pub docs: Vec<PathBuf>,

    /// File types to include (comma-separated, e.g., ".md,.txt")
    #[arg(long)]
    pub file_types: Option<String>,

    /// Include hidden files
    #[arg(long)]
    pub include_hidden: bool,

    /// Maximum chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Separator to split on before merging
    #[arg(long)]
    pub separator: Option<String>,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: IngestArgs, quiet: bool) -> anyhow::Result<()> {
    if args.url.is_empty() && args.docs.is_empty() {
        anyhow::bail!("Nothing to ingest. Pass --url and/or --docs.");
    }

    let mut config = args.backend.resolve();
    if let Some(size) = args.chunk_size {
        config.ingest.chunk_size = size;
    }
    if let Some(overlap) = args.chunk_overlap {
        config.ingest.chunk_overlap = overlap;
    }
    if let Some(separator) = args.separator {
        config.ingest.separator = separator;
    }

    // Load documents
    let progress = spinner(quiet);
    progress.set_message("Loading documents...");

    let loader = WebLoader::new(config.http.timeout_secs);
    let mut documents: Vec<Document> = try_join_all(args.url.iter().map(|u| loader.load(u))).await?;

    if !args.docs.is_empty() {
        let extensions: Vec<String> = match &args.file_types {
            Some(list) => list
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| if s.starts_with('.') { s.to_string() } else { format!(".{}", s) })
                .collect(),
            None => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };
        documents.extend(load_paths(&args.docs, &extensions, args.include_hidden)?);
    }
    progress.finish_and_clear();

    // Split
    let splitter = CharacterSplitter::new(
        config.ingest.separator.clone(),
        config.ingest.chunk_size,
        config.ingest.chunk_overlap,
    )?;
    let chunks = splitter.split_documents(&documents);
    if chunks.is_empty() {
        anyhow::bail!("No text found in the given sources");
    }
    info!("Split {} documents into {} chunks", documents.len(), chunks.len());

    // Embed
    let embedder = EmbeddingProvider::from_config(&config.embedding, &config.http)?;
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let texts = truncate_to_token_limit(&texts, get_token_limit(embedder.model_name()))?;

    let progress = bar(quiet, texts.len() as u64);
    let embeddings = embed_in_batches(&embedder, &texts, config.ingest.batch_size, &progress).await?;
    progress.finish_and_clear();

    // Upsert
    let dimensions = embeddings.first().map(|e| e.len()).unwrap_or(0);
    let store = QdrantStore::from_config(&config.vector_store, &config.http);
    store.ensure_collection(dimensions).await?;
    if let Some(warning) = store.embedding_model_warning(embedder.model_name()).await? {
        warn!("{}", warning);
    }

    let points = build_points(chunks, embeddings, embedder.model_name())?;
    let count = points.len();
    let mut points = points.into_iter().peekable();
    while points.peek().is_some() {
        let batch: Vec<NewPoint> = points.by_ref().take(config.ingest.batch_size.max(1)).collect();
        store.upsert(batch).await?;
    }

    println!(
        "Ingested {} chunks from {} documents into '{}' ({} dims)",
        count,
        documents.len(),
        store.collection(),
        dimensions
    );

    Ok(())
}

/// Embed `texts` in order, `batch_size` at a time
async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size.max(1)) {
        let refs: Vec<&str> = batch.iter().map(|s| s.as_str()).collect();
        let vectors = embedder.embed_batch(&refs).await?;
        if vectors.len() != refs.len() {
            anyhow::bail!(
                "Embedding backend returned {} vectors for {} texts",
                vectors.len(),
                refs.len()
            );
        }
        embeddings.extend(vectors);
        progress.inc(batch.len() as u64);
    }

    Ok(embeddings)
}

/// Pair chunks with their vectors in the LangChain payload layout
///
/// The embedding model is recorded in each point's metadata.
fn build_points(
    chunks: Vec<TextChunk>,
    embeddings: Vec<Vec<f32>>,
    model: &str,
) -> anyhow::Result<Vec<NewPoint>> {
    if chunks.len() != embeddings.len() {
        anyhow::bail!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        );
    }

    Ok(chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, vector)| {
            let mut metadata = match chunk.metadata {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            metadata.insert(EMBEDDING_MODEL_KEY.to_string(), model.into());

            let mut payload = serde_json::Map::new();
            payload.insert(CONTENT_KEY.to_string(), chunk.text.into());
            payload.insert(METADATA_KEY.to_string(), serde_json::Value::Object(metadata));
            NewPoint {
                id: uuid::Uuid::new_v4().to_string(),
                vector,
                payload: serde_json::Value::Object(payload),
            }
        })
        .collect())
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress
}

fn bar(quiet: bool, len: u64) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Embedding ({eta})")
    {
        progress.set_style(style.progress_chars("#>-"));
    }
    progress
}
