//! Client construction for OpenAI-compatible APIs (OpenAI, Groq, local servers).

use crate::error::{DocentError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Create a client for an OpenAI-compatible endpoint.
///
/// `api_base` of `None` keeps the library default (`https://api.openai.com/v1`).
pub fn create_client(
    api_base: Option<&str>,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DocentError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    // async-openai retries 429s on its own for up to 15 minutes. Callers
    // decide about retries through `RetryPolicy`, so every error surfaces at once.
    let no_backoff = backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_backoff))
}

/// Classify an async-openai error as transient (worth retrying) or not.
pub fn is_transient(err: &async_openai::error::OpenAIError) -> bool {
    use async_openai::error::OpenAIError;

    match err {
        OpenAIError::Reqwest(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
        }
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref().unwrap_or_default();
            kind.contains("rate_limit")
                || kind.contains("server_error")
                || kind == "overloaded_error"
                || api.message.to_lowercase().contains("rate limit")
        }
        // Error bodies that are not JSON (proxy pages on 5xx) end up here.
        OpenAIError::JSONDeserialize(_) => true,
        _ => false,
    }
}
