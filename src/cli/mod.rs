//! CLI module for Docent.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Docent - ask questions about a handbook
///
/// Indexes a PDF or text document once and answers questions about it,
/// citing the passages each answer is based on.
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Document to index (overrides document.path from the config)
    #[arg(short, long, global = true, env = "DOCENT_DOCUMENT")]
    pub document: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question about the document
    Ask {
        /// The question to ask
        question: String,

        /// Number of passages to ground the answer on
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start an interactive question-and-answer session
    Chat {
        /// Hide the source passages after each answer
        #[arg(long)]
        no_sources: bool,
    },

    /// Show the passages most similar to a query, without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value = "4")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["docent", "-vv", "ask", "What is the attendance policy?", "-k", "6"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { question, top_k } => {
                assert_eq!(question, "What is the attendance policy?");
                assert_eq!(top_k, Some(6));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
