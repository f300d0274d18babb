//! Repository clone action.
use std::fs;
use std::path::Path;

use super::error::ActionError;
use super::fs::ensure_parent_dir;

/// Clone `url` into `dest`.
///
/// An existing repository at `dest` is left as is; callers that want a fresh
/// checkout remove the directory first. An empty directory is cloned into.
///
/// # Errors
///
/// Returns [`ActionError::Clone`] if `dest` holds something other than a
/// repository, or if the clone itself fails.
pub fn clone_repository(url: &str, dest: &Path) -> Result<(), ActionError> {
    if dest.exists() {
        if git2::Repository::open(dest).is_ok() {
            tracing::debug!("{} is already a repository", dest.display());
            return Ok(());
        }
        let empty = fs::read_dir(dest).is_ok_and(|mut entries| entries.next().is_none());
        if !empty {
            return Err(ActionError::Clone {
                url: url.to_string(),
                reason: format!("{} exists and is not a git repository", dest.display()),
            });
        }
    }
    ensure_parent_dir(dest)?;
    git2::Repository::clone(url, dest).map_err(|e| ActionError::Clone {
        url: url.to_string(),
        reason: e.message().to_string(),
    })?;
    Ok(())
}
