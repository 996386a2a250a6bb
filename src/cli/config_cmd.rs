//! Config command - manage devchat configuration

use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Initialize config file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show config file path
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = Config::load();
            let path = Config::config_path();

            if path.exists() {
                println!("Config file: {}", path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", path.display());
            }
            println!();
            print!("{}", render(&config));
        }

        ConfigCommands::Init { force } => {
            let path = Config::config_path();

            if !Config::write_example(force)? {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }

            println!("Created config file at {}", path.display());
            println!();
            println!("The embedding model must match the one the collection was built with.");
            println!();
            println!("Common configurations:");
            println!();
            println!("  # Ollama (default)");
            println!("  [embedding] provider = \"ollama\", model = \"bge-large\"");
            println!("  [llm]       provider = \"ollama\", model = \"llama2\"");
            println!();
            println!("  # Collections built with BAAI/bge-large-en (needs --features local-embeddings)");
            println!("  [embedding] provider = \"local\"");
            println!();
            println!("  # OpenAI-compatible API");
            println!("  [embedding] provider = \"openai\", model = \"text-embedding-3-small\"");
            println!("  [llm]       provider = \"openai\", model = \"gpt-4o-mini\"");
            println!("  # api_key = \"sk-...\"  # or set OPENAI_API_KEY env var");
        }

        ConfigCommands::Path => {
            println!("{}", Config::config_path().display());
        }
    }

    Ok(())
}

/// Render the effective config as TOML with secrets masked
fn render(config: &Config) -> String {
    let mut masked = config.clone();
    mask(&mut masked.embedding.api_key);
    mask(&mut masked.llm.api_key);
    mask(&mut masked.vector_store.api_key);

    toml::to_string_pretty(&masked).unwrap_or_else(|e| format!("# failed to render config: {}\n", e))
}

fn mask(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("***".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_api_keys() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        config.vector_store.api_key = Some("qdrant-secret".to_string());

        let out = render(&config);
        assert!(!out.contains("sk-secret"));
        assert!(!out.contains("qdrant-secret"));
        assert!(out.contains("api_key = \"***\""));
        assert!(out.contains("collection = \"vector_db\""));
    }

    #[test]
    fn test_render_round_trips_without_secrets() {
        let config = Config::default();
        let parsed: Config = toml::from_str(&render(&config)).unwrap();
        assert_eq!(parsed, config);
    }
}
