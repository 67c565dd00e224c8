//! Docent - Ask questions about a document
//!
//! A retrieval-augmented generation (RAG) core for a single handbook-sized
//! document, plus a small CLI on top of it.
//!
//! # Overview
//!
//! Docent:
//! - Loads a PDF or plain-text document page by page
//! - Splits it into overlapping passages and embeds them once
//! - Answers questions with a language model grounded in the closest passages
//! - Returns the supporting passages with every answer
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `document` - Page-segmented document loading
//! - `chunking` - Sliding-window passage splitting
//! - `embedding` - Embedding providers
//! - `vector_index` - Immutable cosine similarity index
//! - `rag` - Retrieval and grounded answer generation
//! - `orchestrator` - Build-once, query-many lifecycle
//!
//! # Example
//!
//! ```rust,no_run
//! use docent::config::Settings;
//! use docent::orchestrator::{ApiKeys, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let keys = ApiKeys::from_env(&settings)?;
//!     let orchestrator = Orchestrator::new(&settings, &keys)?;
//!
//!     orchestrator.build_index(settings.document_path(), false).await?;
//!     let answer = orchestrator.answer("What is the attendance policy?").await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod retry;
pub mod vector_index;

pub use error::{DocentError, Result};
