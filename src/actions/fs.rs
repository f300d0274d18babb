//! Filesystem actions: directories, symlinks, removal.
use std::fs;
use std::path::Path;

use super::error::ActionError;

/// Ensure the parent directory of `path` exists, creating ancestors as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ActionError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ActionError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Create `path` and any missing ancestors. An existing directory is left as is.
///
/// # Errors
///
/// Returns [`ActionError::NotADirectory`] if a non-directory entry occupies
/// `path`, or an I/O error if creation fails.
pub fn ensure_directory(path: &Path) -> Result<(), ActionError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.symlink_metadata().is_ok() {
        return Err(ActionError::NotADirectory {
            path: path.display().to_string(),
        });
    }
    fs::create_dir_all(path).map_err(|e| ActionError::io("create directory", path, e))
}

/// Point `link` at `target`.
///
/// An existing symlink at `link` is replaced; a regular file or directory is
/// never touched.
///
/// # Errors
///
/// Returns [`ActionError::RefusedReplace`] when `link` is occupied by a
/// non-symlink, or an I/O error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), ActionError> {
    if let Ok(meta) = link.symlink_metadata() {
        if meta.file_type().is_symlink() {
            if fs::read_link(link).is_ok_and(|current| current == target) {
                return Ok(());
            }
            fs::remove_file(link).map_err(|e| ActionError::io("remove symlink", link, e))?;
        } else {
            return Err(ActionError::RefusedReplace {
                path: link.display().to_string(),
                kind: if meta.is_dir() { "directory" } else { "file" },
            });
        }
    }
    ensure_parent_dir(link)?;
    symlink(target, link).map_err(|e| ActionError::io("create symlink", link, e))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are only supported on Unix hosts",
    ))
}

/// Remove whatever lives at `path`. A missing path is not an error.
///
/// Symlinks are removed themselves, never followed.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<(), ActionError> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| ActionError::io("remove directory", path, e))
    } else {
        fs::remove_file(path).map_err(|e| ActionError::io("remove", path, e))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parent_dir_creates_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/c/file.txt");
        ensure_parent_dir(&file).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn ensure_parent_dir_bare_name() {
        ensure_parent_dir(Path::new("file.txt")).unwrap();
    }

    #[test]
    fn ensure_directory_existing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep"), "x").unwrap();
        ensure_directory(dir.path()).unwrap();
        assert!(dir.path().join("keep").exists(), "contents untouched");
    }

    #[test]
    fn ensure_directory_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x/y/z");
        ensure_directory(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn ensure_directory_refuses_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_directory(&file),
            Err(ActionError::NotADirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_created_with_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, "t").unwrap();
        let link = dir.path().join("bin/link");
        create_symlink(&target, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_replaces_stale_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("/nonexistent/old", &link).unwrap();
        let target = dir.path().join("new");
        create_symlink(&target, &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_refuses_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        fs::write(&link, "real data").unwrap();
        let err = create_symlink(Path::new("/anything"), &link).unwrap_err();
        assert!(matches!(err, ActionError::RefusedReplace { kind: "file", .. }));
        assert_eq!(fs::read_to_string(&link).unwrap(), "real data");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_refuses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_symlink(Path::new("/anything"), dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ActionError::RefusedReplace {
                kind: "directory",
                ..
            }
        ));
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        remove_path(&dir.path().join("nope")).unwrap();
    }

    #[test]
    fn remove_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("alacritty");
        fs::create_dir_all(tree.join("src")).unwrap();
        fs::write(tree.join("src/main.rs"), "fn main() {}").unwrap();
        remove_path(&tree).unwrap();
        assert!(!tree.exists());
    }

    #[cfg(unix)]
    #[test]
    fn remove_symlink_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        remove_path(&link).unwrap();
        assert!(target.is_dir());
        assert!(link.symlink_metadata().is_err());
    }
}
