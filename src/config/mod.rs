//! Configuration module for Docent.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    DocumentSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings,
    GenerationSettings, PromptSettings, RetrievalSettings, RetrySettings, Settings,
    TimeoutSettings,
};
