//! Search command - show what the retriever returns for a question

use clap::Args;

use crate::rag::Retriever;

use super::BackendArgs;

#[derive(Args)]
pub struct SearchArgs {
    /// Question to retrieve context for
    pub question: String,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let config = args.backend.resolve();
    let retriever = Retriever::from_config(&config)?;

    let chunks = retriever.retrieve(&args.question).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    println!(
        "\nContext for '{}' (top {} from '{}'):\n",
        args.question,
        chunks.len(),
        config.vector_store.collection
    );

    for (i, chunk) in chunks.iter().enumerate() {
        println!("{}. Score: {:.4}", i + 1, chunk.score);
        if let Some(source) = chunk.source() {
            println!("   Source: {}", source);
        }

        let display_text: String = if chunk.text.chars().count() > 200 {
            format!("{}...", chunk.text.chars().take(200).collect::<String>())
        } else {
            chunk.text.clone()
        };
        println!("   {}", display_text);
        println!();
    }

    Ok(())
}
