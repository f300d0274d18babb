//! HTTP(S) download action.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::error::ActionError;
use super::fs::ensure_parent_dir;

/// Seconds to wait for a TCP connection.
const CONNECT_TIMEOUT: u64 = 10;
/// Upper bound for a whole transfer; installers and fonts can be large.
const TRANSFER_TIMEOUT: u64 = 600;
/// Attempts made when the transport (not the server) fails.
const RETRY_COUNT: u32 = 3;
/// Pause between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Build the HTTP agent used for downloads.
#[must_use]
pub fn default_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
        .timeout_global(Some(Duration::from_secs(TRANSFER_TIMEOUT)))
        .build()
        .into()
}

/// Fetch `url` into `dest`, replacing whatever is there.
///
/// The body is streamed into a sibling temporary file which is renamed over
/// `dest` only after the transfer (and checksum, when given) succeeds, so an
/// interrupted download never leaves a truncated destination behind.
///
/// # Errors
///
/// Returns an error on transport or HTTP failure, on a checksum mismatch, or
/// when the destination cannot be written.
pub fn download(
    agent: &ureq::Agent,
    url: &str,
    dest: &Path,
    sha256: Option<&str>,
) -> Result<(), ActionError> {
    ensure_parent_dir(dest)?;
    let tmp = partial_path(dest);
    let result = fetch_with_retry(agent, url, &tmp)
        .and_then(|()| sha256.map_or(Ok(()), |expected| verify(&tmp, expected)))
        .and_then(|()| fs::rename(&tmp, dest).map_err(|e| ActionError::io("rename", dest, e)));
    if result.is_err() {
        fs::remove_file(&tmp).ok();
    }
    result
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    dest.with_file_name(name)
}

fn fetch_with_retry(agent: &ureq::Agent, url: &str, to: &Path) -> Result<(), ActionError> {
    let mut attempt = 1;
    loop {
        match fetch(agent, url, to) {
            Err(FetchError::Transport(reason)) if attempt < RETRY_COUNT => {
                tracing::debug!("download of {url} failed (attempt {attempt}): {reason}");
                attempt += 1;
                thread::sleep(RETRY_DELAY);
            }
            Err(FetchError::Transport(reason) | FetchError::Fatal(reason)) => {
                return Err(ActionError::Download {
                    url: url.to_string(),
                    reason,
                });
            }
            Err(FetchError::Io(e)) => return Err(ActionError::io("write", to, e)),
            Ok(()) => return Ok(()),
        }
    }
}

enum FetchError {
    /// Worth retrying: connection reset, DNS hiccup, timeout.
    Transport(String),
    /// The server answered, just not with the file.
    Fatal(String),
    Io(io::Error),
}

fn fetch(agent: &ureq::Agent, url: &str, to: &Path) -> Result<(), FetchError> {
    let mut response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::StatusCode(code) => FetchError::Fatal(format!("HTTP {code}")),
        other => FetchError::Transport(other.to_string()),
    })?;
    let mut file = File::create(to).map_err(FetchError::Io)?;
    io::copy(&mut response.body_mut().as_reader(), &mut file).map_err(|e| {
        if e.kind() == io::ErrorKind::Other {
            FetchError::Transport(e.to_string())
        } else {
            FetchError::Io(e)
        }
    })?;
    Ok(())
}

fn verify(path: &Path, expected: &str) -> Result<(), ActionError> {
    let actual = compute_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ActionError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String, ActionError> {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let mut file = File::open(path).map_err(|e| ActionError::io("open", path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| ActionError::io("read", path, e))?;
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_is_a_sibling() {
        let p = partial_path(Path::new("/tmp/dl/git-delta.deb"));
        assert_eq!(p, Path::new("/tmp/dl/git-delta.deb.partial"));
    }

    #[test]
    fn sha256_known_content() {
        // echo -n "hello world" | sha256sum
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "hello world").unwrap();
        assert_eq!(
            compute_sha256(&file).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn verify_accepts_uppercase_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "hello world").unwrap();
        verify(
            &file,
            "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9",
        )
        .unwrap();
    }

    #[test]
    fn verify_rejects_wrong_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "hello world").unwrap();
        let err = verify(&file, "00").unwrap_err();
        assert!(matches!(err, ActionError::ChecksumMismatch { .. }));
    }

    #[test]
    fn unreachable_host_fails_without_touching_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        fs::write(&dest, "previous").unwrap();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .proxy(None)
            .timeout_connect(Some(Duration::from_millis(200)))
            .build()
            .into();
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let err = download(&agent, "http://127.0.0.1:9/file", &dest, None).unwrap_err();
        assert!(matches!(err, ActionError::Download { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous");
        assert!(!partial_path(&dest).exists());
    }
}
