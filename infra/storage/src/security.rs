use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` / `..` lexically while ensuring the path never escapes the sandbox root.
///
/// `..` is accepted as long as it does not climb above the (empty) relative base.
pub(crate) fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Safely joins a relative path to the canonical `root` and proves containment.
///
/// Existing targets are canonicalized (symlinks resolved) and compared component-wise
/// against the root. Targets that do not exist yet are validated through their first
/// existing ancestor.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: path.display().to_string().into(),
            context: Some("Absolute paths are not allowed in sandbox".into()),
        });
    }

    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_path(root, &joined),
        Err(e) => Err(StorageError::Io {
            source: e,
            context: Some(format!("Failed to canonicalize {}", joined.display()).into()),
        }),
    }
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    // `Path::starts_with` compares whole components: `/srv/picturesEVIL` is not under `/srv/pictures`.
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Resolved path lies outside the storage root".into()),
        })
    }
}

/// Validates a path that does not exist yet by verifying its first existing ancestor.
///
/// # Security
/// - Prevents symlink attacks by canonicalizing the first existing ancestor
/// - Ensures the entire path chain originates from within the sandbox
fn validate_path(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        // `symlink_metadata` so a dangling link is seen as existing rather than skipped.
        if path.symlink_metadata().is_ok() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing ancestor is a symlink outside sandbox".into()),
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Dangling symlink inside sandbox".into()),
                    })
                },
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn canonical_root() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("pictures");
        std::fs::create_dir_all(&root).unwrap();
        let root = root.canonicalize().unwrap();
        (tmp, root)
    }

    #[test]
    fn normalize_collapses_inner_parent_dirs() {
        let out = normalize_relative(Path::new("a/./b/../c.png")).unwrap();
        assert_eq!(out, PathBuf::from("a/c.png"));
    }

    #[test]
    fn normalize_rejects_escape_and_absolute() {
        assert!(matches!(
            normalize_relative(Path::new("../etc/passwd")),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
        assert!(matches!(
            normalize_relative(Path::new("a/../../b")),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
        assert!(matches!(
            normalize_relative(Path::new("/etc/passwd")),
            Err(StorageError::PathTraversalAttempt { .. })
        ));
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_contained() {
        let (tmp, root) = canonical_root();
        let evil = tmp.path().join("picturesEVIL").join("x.png");
        assert!(evil.to_string_lossy().starts_with(&*root.to_string_lossy()));

        let res = validate_canonical(&root, evil);
        assert!(matches!(res, Err(StorageError::PathTraversalAttempt { .. })));
    }

    #[test]
    fn missing_target_is_validated_through_root() {
        let (_tmp, root) = canonical_root();
        let resolved = resolve_path(&root, "new.png").unwrap();
        assert_eq!(resolved, root.join("new.png"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let (tmp, root) = canonical_root();
        let outside = tmp.path().join("secret.png");
        std::fs::write(&outside, b"secret").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link.png")).unwrap();

        let res = resolve_path(&root, "link.png");
        assert!(matches!(res, Err(StorageError::PathTraversalAttempt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_out_of_root_is_rejected_for_new_files() {
        let (tmp, root) = canonical_root();
        let outside = tmp.path().join("elsewhere");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("dir")).unwrap();

        let res = resolve_path(&root, "dir/new.png");
        assert!(matches!(res, Err(StorageError::PathTraversalAttempt { .. })));
    }
}
