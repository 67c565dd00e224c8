//! Error types for Docent.

use thiserror::Error;

/// Library-level error type for Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Embedding service error: {message}")]
    EmbeddingService { message: String, transient: bool },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Cannot build a vector index from zero passages")]
    EmptyIndex,

    #[error("No context passages were supplied to the answer generator")]
    NoContext,

    #[error("Generation service error: {message}")]
    GenerationService { message: String, transient: bool },

    #[error("Index is not ready: {0}")]
    NotReady(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DocentError {
    /// Build an embedding error that will not be retried.
    pub fn embedding(message: impl Into<String>) -> Self {
        DocentError::EmbeddingService {
            message: message.into(),
            transient: false,
        }
    }

    /// Build an embedding error that is worth retrying (rate limit, 5xx, timeout).
    pub fn embedding_transient(message: impl Into<String>) -> Self {
        DocentError::EmbeddingService {
            message: message.into(),
            transient: true,
        }
    }

    /// Build a generation error.
    pub fn generation(message: impl Into<String>, transient: bool) -> Self {
        DocentError::GenerationService {
            message: message.into(),
            transient,
        }
    }

    /// Name of the error kind, for callers that render it next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            DocentError::DocumentLoad(_) => "DocumentLoadError",
            DocentError::EmbeddingService { .. } => "EmbeddingServiceError",
            DocentError::DimensionMismatch(_) => "DimensionMismatchError",
            DocentError::EmptyIndex => "EmptyIndexError",
            DocentError::NoContext => "NoContextError",
            DocentError::GenerationService { .. } => "GenerationServiceError",
            DocentError::NotReady(_) => "NotReadyError",
            DocentError::Config(_) => "ConfigError",
            DocentError::InvalidInput(_) => "InvalidInputError",
            DocentError::Io(_) => "IoError",
            DocentError::Json(_) => "JsonError",
            DocentError::TomlParse(_) => "ConfigError",
            DocentError::Http(_) => "HttpError",
        }
    }

    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            DocentError::EmbeddingService { transient, .. }
            | DocentError::GenerationService { transient, .. } => *transient,
            DocentError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Result type alias for Docent operations.
pub type Result<T> = std::result::Result<T, DocentError>;
