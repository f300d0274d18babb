//! `~` and environment variable expansion for plan strings.
use std::env::VarError;
use std::path::PathBuf;

use crate::error::PlanError;

/// Variable naming the plan's scratch directory.
pub const TMP_VAR: &str = "PROVISION_TMP";

/// Expands plan strings against the home directory, the environment and
/// `$PROVISION_TMP`.
#[derive(Debug, Clone)]
pub struct Expander {
    home: Option<String>,
    tmp: String,
}

impl Expander {
    /// Expander using `$HOME` from the environment.
    #[must_use]
    pub fn new(tmp: impl Into<String>) -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            tmp: tmp.into(),
        }
    }

    /// Expander with an explicit home directory.
    #[must_use]
    pub fn with_home(home: impl Into<String>, tmp: impl Into<String>) -> Self {
        Self {
            home: Some(home.into()),
            tmp: tmp.into(),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in a path.
    ///
    /// Undefined variables are left as written.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Expand`] if a variable holds non-unicode data.
    pub fn path(&self, input: &str) -> Result<PathBuf, PlanError> {
        let home = self.home.as_deref();
        let expanded = shellexpand::full_with_context(
            input,
            || home,
            |name: &str| -> Result<Option<String>, VarError> {
                if name == TMP_VAR {
                    return Ok(Some(self.tmp.clone()));
                }
                if name == "HOME"
                    && let Some(home) = home
                {
                    return Ok(Some(home.to_string()));
                }
                match std::env::var(name) {
                    Ok(value) => Ok(Some(value)),
                    Err(VarError::NotPresent) => Ok(None),
                    Err(e) => Err(e),
                }
            },
        )
        .map_err(|e| PlanError::Expand {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Substitute `$PROVISION_TMP` and `${PROVISION_TMP}` in a shell command.
    ///
    /// Everything else, including longer names such as `$PROVISION_TMPDIR`,
    /// `$$` and `${VAR:-default}`, is passed to `sh` untouched.
    #[must_use]
    pub fn command(&self, input: &str) -> String {
        let braced = format!("${{{TMP_VAR}}}");
        let bare = format!("${TMP_VAR}");
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(idx) = rest.find('$') {
            let (head, tail) = rest.split_at(idx);
            out.push_str(head);
            if let Some(after) = tail.strip_prefix("$$") {
                out.push_str("$$");
                rest = after;
            } else if let Some(after) = tail.strip_prefix(braced.as_str()) {
                out.push_str(&self.tmp);
                rest = after;
            } else if let Some(after) = tail
                .strip_prefix(bare.as_str())
                .filter(|after| !after.starts_with(is_name_char))
            {
                out.push_str(&self.tmp);
                rest = after;
            } else {
                out.push('$');
                rest = tail.strip_prefix('$').unwrap_or_default();
            }
        }
        out.push_str(rest);
        out
    }
}

/// Characters that continue a shell variable name.
const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
