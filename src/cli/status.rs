//! Status command - report on the configured collection

use clap::Args;

use crate::store::QdrantStore;

use super::BackendArgs;

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: StatusArgs) -> anyhow::Result<()> {
    let config = args.backend.resolve();
    let store = QdrantStore::from_config(&config.vector_store, &config.http);

    println!("Qdrant:     {}", config.vector_store.url);
    println!("Collection: {}", store.collection());

    if !store.collection_exists().await? {
        println!("Status:     missing (run 'devchat ingest' to create it)");
        return Ok(());
    }

    let info = store.collection_info().await?;
    println!("Status:     {}", info.status);
    println!("Points:     {}", info.points_count);
    if let Some(size) = info.vector_size {
        println!(
            "Vectors:    {} dims, {}",
            size,
            info.distance.as_deref().unwrap_or("unknown distance")
        );
    }
    let model = config.embedding.model_name();
    println!("Embedding:  {} ({})", model, config.embedding.provider);
    if let Some(warning) = store.embedding_model_warning(&model).await? {
        println!("Warning:    {}", warning);
    }
    println!("LLM:        {} ({})", config.llm.model, config.llm.provider);

    Ok(())
}
