//! Search command implementation.

use super::open_index;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    let orchestrator = open_index(&settings).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.retrieve_top(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No passages matched your query.");
            } else {
                Output::success(&format!("Found {} passages", results.len()));

                for (i, result) in results.iter().enumerate() {
                    Output::passage(
                        i + 1,
                        result.passage.source_page,
                        result.score,
                        &result.passage.text,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
