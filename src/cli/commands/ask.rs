//! Ask command implementation.

use super::open_index;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, top_k: Option<usize>, mut settings: Settings) -> Result<()> {
    if let Some(k) = top_k {
        settings.retrieval.top_k = k;
    }

    let orchestrator = open_index(&settings).await?;

    let spinner = Output::spinner("Thinking...");
    let result = orchestrator.answer(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer.text);

            Output::header("Source Context");
            for (i, source) in answer.sources.iter().enumerate() {
                Output::passage(
                    i + 1,
                    source.passage.source_page,
                    source.score,
                    &source.passage.text,
                );
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {} ({})", e, e.kind()));
            return Err(e.into());
        }
    }

    Ok(())
}
