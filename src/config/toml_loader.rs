//! TOML file parsing into serde types.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::PlanError;

/// Deserialize `content`; `origin` names the source in error messages.
///
/// # Errors
///
/// Returns [`PlanError::Parse`] if the content is not valid TOML for `T`.
pub fn parse_config<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, PlanError> {
    toml::from_str(content).map_err(|e| PlanError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

/// Read and deserialize the TOML file at `path`.
///
/// A missing file is an error: callers only pass paths the user asked for.
///
/// # Errors
///
/// Returns [`PlanError::Read`] if the file cannot be read, or
/// [`PlanError::Parse`] if it cannot be parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, PlanError> {
    let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, &path.display().to_string())
}
