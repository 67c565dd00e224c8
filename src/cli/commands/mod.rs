//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run pre-flight checks, create the orchestrator and index the configured document.
pub(crate) async fn open_index(settings: &Settings) -> Result<Orchestrator> {
    let document = settings.document_path();

    let keys = match preflight::check(settings, &document) {
        Ok(keys) => keys,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let orchestrator = Orchestrator::new(settings, &keys)?;

    let spinner = Output::spinner(&format!("Indexing {}...", document.display()));
    let result = orchestrator.build_index(&document, false).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} passages from {} pages",
                report.passages_indexed, report.pages
            ));
            Ok(orchestrator)
        }
        Err(e) => {
            Output::error(&format!("{} ({})", e, e.kind()));
            Err(e.into())
        }
    }
}
