//! Pre-flight checks before expensive operations.
//!
//! Validates that the document and API keys are available before any
//! embedding work starts.

use crate::config::Settings;
use crate::error::{DocentError, Result};
use crate::orchestrator::ApiKeys;
use std::path::Path;

/// Run pre-flight checks and return the resolved API keys.
pub fn check(settings: &Settings, document: &Path) -> Result<ApiKeys> {
    settings.validate()?;
    check_document(document)?;
    ApiKeys::from_env(settings)
}

/// Check that the document exists and is a file.
fn check_document(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DocentError::DocumentLoad(format!(
            "{} does not exist. Pass --document or set document.path in the config.",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(DocentError::DocumentLoad(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(())
}
