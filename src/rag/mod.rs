//! RAG (Retrieval-Augmented Generation) for question answering with sources.

pub mod context;
mod generator;
mod retriever;

pub use generator::{AnswerGenerator, ChatGenerator};
pub use retriever::Retriever;

use crate::vector_index::SearchResult;
use serde::Serialize;

/// A generated answer with the passages that grounded it.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The generated answer.
    pub text: String,
    /// Retrieved passages, best first.
    pub sources: Vec<SearchResult>,
}

impl Answer {
    /// Format the answer and its sources for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.text.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            output.push_str(&context::format_context_for_display(&self.sources));
        }

        output
    }
}
