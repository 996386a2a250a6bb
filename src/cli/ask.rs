//! Ask command - RAG question answering

use clap::Args;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::rag::{AnswerPipeline, PipelineCache};

use super::{check_embedding_model, BackendArgs};

#[derive(Args)]
pub struct AskArgs {
    /// Question to ask (omit for interactive mode)
    pub question: Option<String>,

    /// Interactive chat mode
    #[arg(short, long)]
    pub interactive: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn run(args: AskArgs, quiet: bool) -> anyhow::Result<()> {
    if args.interactive {
        return run_interactive(&args.backend).await;
    }

    let question = args.question.ok_or_else(|| {
        anyhow::anyhow!("Question required in non-interactive mode. Use -i for interactive mode.")
    })?;

    let config = args.backend.resolve();
    let pipeline = AnswerPipeline::from_config(&config)?;
    check_embedding_model(&config).await;

    if !quiet {
        println!(
            "Using {} model {} over collection '{}'",
            config.llm.provider, config.llm.model, config.vector_store.collection
        );
    }

    let answer = pipeline.answer(&question).await?;
    if quiet {
        println!("{}", answer);
    } else {
        println!("\nAnswer:\n{}", answer);
    }
    Ok(())
}

/// Prompt for questions until EOF, `quit` or `exit`
///
/// The config is re-read before every question; the pipeline is rebuilt
/// only when the settings that shape it have changed.
async fn run_interactive(backend: &BackendArgs) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut cache = PipelineCache::new();

    check_embedding_model(&backend.resolve()).await;
    println!("\nInteractive mode. Type 'quit' or 'exit' to leave.\n");

    loop {
        let line = match editor.readline("Question: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let question = match parse_line(&line) {
            ReplInput::Quit => break,
            ReplInput::Question(question) => question,
        };
        if !question.is_empty() {
            editor.add_history_entry(question)?;
        }

        let config = backend.resolve();
        let pipeline = match cache.get_for_config(&config) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                eprintln!("\nError: {}\n", e);
                continue;
            }
        };

        match pipeline.answer(question).await {
            Ok(answer) => println!("\nAnswer: {}\n", answer),
            Err(e) => eprintln!("\nError: {:#}\n", e),
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Quit,
    Question(&'a str),
}

/// Classify one line of interactive input
///
/// An empty line is a question like any other, as in one-shot mode and the
/// server.
fn parse_line(line: &str) -> ReplInput<'_> {
    match line.trim() {
        "quit" | "exit" => ReplInput::Quit,
        question => ReplInput::Question(question),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_quit_words() {
        assert_eq!(parse_line("quit"), ReplInput::Quit);
        assert_eq!(parse_line("  exit \n"), ReplInput::Quit);
    }

    #[test]
    fn test_parse_line_empty_question_passes_through() {
        assert_eq!(parse_line(""), ReplInput::Question(""));
        assert_eq!(parse_line("   "), ReplInput::Question(""));
    }

    #[test]
    fn test_parse_line_trims_question() {
        assert_eq!(
            parse_line("  what is a lifetime?  "),
            ReplInput::Question("what is a lifetime?")
        );
    }
}
