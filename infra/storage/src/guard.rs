use crate::error::StorageError;
use crate::security;
use sbox_domain::policy::UploadPolicy;
use std::path::{Path, PathBuf};

/// Read-side authorization for already percent-decoded path segments.
///
/// A request is authorized only when its canonical form lies under the canonical
/// storage root and the target carries an extension from the upload allow-list.
/// Neither check implies the other: a contained `notes.txt` is still refused.
#[derive(Debug, Clone, Copy)]
pub struct PathGuard<'a> {
    root: &'a Path,
    policy: &'a UploadPolicy,
}

impl<'a> PathGuard<'a> {
    /// `root` must already be canonical (see [`crate::Storage`]).
    #[must_use]
    pub const fn new(root: &'a Path, policy: &'a UploadPolicy) -> Self {
        Self { root, policy }
    }

    /// Returns the canonical (or, for missing files, root-anchored) path on success.
    ///
    /// Empty segments (`a//b`) are ignored. A decoded segment that still carries a
    /// separator or a NUL byte was smuggled through percent-encoding and is refused.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] for anything resolving outside the root,
    /// [`StorageError::DisallowedFileType`] for a contained path of the wrong type.
    pub fn authorize<I, S>(&self, segments: I) -> Result<PathBuf, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut relative = PathBuf::new();

        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            if segment.contains(['/', '\\', '\0']) {
                return Err(StorageError::PathTraversalAttempt {
                    message: segment.to_owned().into(),
                    context: Some("Encoded separator or NUL in path segment".into()),
                });
            }
            relative.push(segment);
        }

        let resolved = security::resolve_path(self.root, &relative)?;

        let allowed = resolved
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.policy.allows_filename(name));

        if allowed {
            Ok(resolved)
        } else {
            Err(StorageError::DisallowedFileType {
                message: relative.display().to_string().into(),
                context: Some("Only image files are served".into()),
            })
        }
    }

    #[must_use]
    pub fn is_authorized<I, S>(&self, segments: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.authorize(segments).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, UploadPolicy) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("pictures");
        std::fs::create_dir_all(&root).unwrap();
        let root = root.canonicalize().unwrap();
        (tmp, root, UploadPolicy::default())
    }

    #[test]
    fn contained_images_are_authorized_even_if_missing() {
        let (_tmp, root, policy) = setup();
        let guard = PathGuard::new(&root, &policy);

        assert_eq!(guard.authorize(["cat.png"]).unwrap(), root.join("cat.png"));
        assert!(guard.is_authorized(["album", "dog.JPG"]));
        assert!(guard.is_authorized(["", "a", "", "b.gif"]));
    }

    #[test]
    fn traversal_is_rejected() {
        let (_tmp, root, policy) = setup();
        let guard = PathGuard::new(&root, &policy);

        for segments in [
            vec!["..", "..", "etc", "passwd"],
            vec!["../../etc/passwd"],
            vec!["..", "x.png"],
            vec!["a", "..", "..", "x.png"],
            vec!["..\\x.png"],
            vec!["x.png\0.txt"],
        ] {
            assert!(
                matches!(guard.authorize(&segments), Err(StorageError::PathTraversalAttempt { .. })),
                "segments = {segments:?}"
            );
        }
    }

    #[test]
    fn sibling_directory_with_shared_prefix_is_rejected() {
        let (tmp, root, policy) = setup();
        std::fs::create_dir_all(tmp.path().join("picturesEVIL")).unwrap();
        std::fs::write(tmp.path().join("picturesEVIL").join("x.png"), b"x").unwrap();
        let guard = PathGuard::new(&root, &policy);

        assert!(!guard.is_authorized(["..", "picturesEVIL", "x.png"]));
    }

    #[test]
    fn disallowed_types_are_rejected_inside_root() {
        let (_tmp, root, policy) = setup();
        std::fs::write(root.join("shell.exe"), b"MZ").unwrap();
        let guard = PathGuard::new(&root, &policy);

        assert!(matches!(
            guard.authorize(["shell.exe"]),
            Err(StorageError::DisallowedFileType { .. })
        ));
        assert!(!guard.is_authorized(Vec::<&str>::new()));
        assert!(!guard.is_authorized([".png"]));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_other_type_is_judged_by_target() {
        let (_tmp, root, policy) = setup();
        std::fs::write(root.join("script.sh"), b"#!/bin/sh").unwrap();
        std::os::unix::fs::symlink(root.join("script.sh"), root.join("innocent.png")).unwrap();
        let guard = PathGuard::new(&root, &policy);

        assert!(matches!(
            guard.authorize(["innocent.png"]),
            Err(StorageError::DisallowedFileType { .. })
        ));
    }
}
