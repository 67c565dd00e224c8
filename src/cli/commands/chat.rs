//! Interactive question-and-answer session.

use super::open_index;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(show_sources: bool, settings: Settings) -> Result<()> {
    let orchestrator = open_index(&settings).await?;

    println!("\n{}", style("Docent").bold().cyan());
    println!(
        "{}\n",
        style("Ask anything about the document, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let result = orchestrator.answer(input).await;
        spinner.finish_and_clear();

        // A failed question leaves the index intact; keep the session going.
        match result {
            Ok(answer) => {
                println!("\n{} {}\n", style("Docent:").cyan().bold(), answer.text);

                if show_sources {
                    for (i, source) in answer.sources.iter().enumerate() {
                        Output::passage(
                            i + 1,
                            source.passage.source_page,
                            source.score,
                            &source.passage.text,
                        );
                    }
                    println!();
                }
            }
            Err(e) => {
                Output::error(&format!("{}: {}", e.kind(), e));
            }
        }
    }

    Ok(())
}
