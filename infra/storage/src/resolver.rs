//! Turns an untrusted client filename into a safe, bounded, non-colliding path.
//!
//! The pipeline is strictly ordered:
//! 1. sanitize (basename, NUL bytes, leading dots/spaces, default name),
//! 2. length bound (stem truncated, extension preserved),
//! 3. extension policy (after sanitization so case and path tricks cannot bypass it),
//! 4. collision avoidance (`name.ext`, `name_1.ext`, ...),
//! 5. canonical containment under the storage root.

use crate::error::StorageError;
use crate::security;
use sbox_domain::policy::{UploadPolicy, split_extension};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A filename that passed sanitization, length bounding and the extension policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedName {
    stem: String,
    extension: String,
}

impl SanitizedName {
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Extension as supplied by the client (original case, no dot).
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// The outcome of a (check-then-act) resolution against the current directory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpload {
    pub filename: String,
    pub path: PathBuf,
    pub name: SanitizedName,
    /// `0` for the plain name, `n` for the `_n` suffix.
    pub attempt: u32,
}

/// Resolves upload filenames against a canonical storage root.
#[derive(Debug, Clone, Copy)]
pub struct FilenameResolver<'a> {
    root: &'a Path,
    policy: &'a UploadPolicy,
}

impl<'a> FilenameResolver<'a> {
    /// `root` must already be canonical (see [`crate::Storage`]).
    #[must_use]
    pub const fn new(root: &'a Path, policy: &'a UploadPolicy) -> Self {
        Self { root, policy }
    }

    /// Steps 1-3: sanitize, bound and check the extension.
    ///
    /// # Errors
    /// [`StorageError::DisallowedFileType`] if the sanitized name has no allowed extension.
    pub fn sanitize(&self, raw: &str) -> Result<SanitizedName, StorageError> {
        let cleaned = sanitize_filename(raw, &self.policy.default_filename);
        let bounded = bound_length(&cleaned, self.policy.max_filename_length);

        match split_extension(&bounded) {
            (stem, Some(ext)) if !stem.is_empty() && self.policy.allows_extension(ext) => {
                Ok(SanitizedName { stem: stem.to_owned(), extension: ext.to_owned() })
            },
            _ => Err(StorageError::DisallowedFileType {
                message: bounded.to_string().into(),
                context: Some("Only image uploads are accepted".into()),
            }),
        }
    }

    /// The filename for a given collision attempt, always within the length bound.
    #[must_use]
    pub fn candidate(&self, name: &SanitizedName, attempt: u32) -> String {
        let suffix = if attempt == 0 {
            format!(".{}", name.extension)
        } else {
            format!("_{attempt}.{}", name.extension)
        };
        let budget = self.policy.max_filename_length.saturating_sub(suffix.len());
        format!("{}{suffix}", truncate_bytes(&name.stem, budget))
    }

    /// Step 5: canonical containment of a candidate filename.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] if the path escapes the root.
    pub fn locate(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let path = security::resolve_path(self.root, filename)?;
        if path.parent() == Some(self.root) {
            Ok(path)
        } else {
            Err(StorageError::PathTraversalAttempt {
                message: filename.to_owned().into(),
                context: Some("Upload must land directly in the storage root".into()),
            })
        }
    }

    /// Full check-then-act resolution against the current directory contents.
    ///
    /// The returned path did not exist at the time of the call; [`crate::Storage::store`]
    /// re-validates with an exclusive create.
    ///
    /// # Errors
    /// Sanitization and containment errors, or [`StorageError::TooManyCollisions`] once
    /// the attempt bound is exhausted.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedUpload, StorageError> {
        let name = self.sanitize(raw)?;

        for attempt in 0..self.policy.max_collision_attempts {
            let filename = self.candidate(&name, attempt);
            if self.is_taken(&filename) {
                continue;
            }
            let path = self.locate(&filename)?;
            return Ok(ResolvedUpload { filename, path, name, attempt });
        }

        Err(self.exhausted(&name))
    }

    /// Any directory entry counts, including dangling symlinks.
    pub(crate) fn is_taken(&self, filename: &str) -> bool {
        self.root.join(filename).symlink_metadata().is_ok()
    }

    pub(crate) fn exhausted(&self, name: &SanitizedName) -> StorageError {
        StorageError::TooManyCollisions {
            message: self.candidate(name, 0).into(),
            context: Some(format!("{} attempts", self.policy.max_collision_attempts).into()),
        }
    }
}

/// Step 1: strips directories, NUL bytes and leading dots/spaces.
///
/// Both `/` and `\` count as separators regardless of platform.
#[must_use]
pub fn sanitize_filename(raw: &str, default: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let without_nul: String = base.chars().filter(|&c| c != '\0').collect();
    let trimmed = without_nul.trim_start_matches(['.', ' ']);

    if trimmed.is_empty() { default.to_owned() } else { trimmed.to_owned() }
}

/// Step 2: keeps `name` within `max` bytes, cutting the stem and preserving the extension.
#[must_use]
pub fn bound_length(name: &str, max: usize) -> Cow<'_, str> {
    if name.len() <= max {
        return Cow::Borrowed(name);
    }
    match split_extension(name) {
        (stem, Some(ext)) if ext.len() + 1 < max => {
            let stem = truncate_bytes(stem, max - ext.len() - 1);
            Cow::Owned(format!("{stem}.{ext}"))
        },
        _ => Cow::Borrowed(truncate_bytes(name, max)),
    }
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
