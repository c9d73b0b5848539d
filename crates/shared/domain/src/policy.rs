use crate::constants::{
    ALLOWED_EXTENSIONS, DEFAULT_UPLOAD_NAME, MAX_COLLISION_ATTEMPTS, MAX_FILE_SIZE,
    MAX_FILENAME_LENGTH,
};
use serde::Deserialize;

/// Immutable limits applied to every upload and every served picture.
///
/// Extensions are stored lowercase and without the leading dot. The same set
/// governs both the write path (upload) and the read path (serving).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    pub max_filename_length: usize,
    pub max_collision_attempts: u32,
    pub allowed_extensions: Vec<String>,
    pub default_filename: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_filename_length: MAX_FILENAME_LENGTH,
            max_collision_attempts: MAX_COLLISION_ATTEMPTS,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            default_filename: DEFAULT_UPLOAD_NAME.to_owned(),
        }
    }
}

impl UploadPolicy {
    /// Case-insensitive membership test. Accepts the extension with or without a leading dot.
    #[must_use]
    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        !ext.is_empty() && self.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(ext))
    }

    /// Whether a bare filename carries an allowed extension.
    #[must_use]
    pub fn allows_filename(&self, name: &str) -> bool {
        split_extension(name).1.is_some_and(|ext| self.allows_extension(ext))
    }
}

/// Splits `name` into stem and extension at the last dot.
///
/// A leading dot does not start an extension (`.png` has no extension), mirroring
/// how hidden files are treated by most tooling.
#[must_use]
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_checks_ignore_case_and_dot() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_extension("PNG"));
        assert!(policy.allows_extension(".jpeg"));
        assert!(!policy.allows_extension("exe"));
        assert!(!policy.allows_extension(""));
        assert!(!policy.allows_extension("."));
    }

    #[test]
    fn filename_checks_use_last_extension() {
        let policy = UploadPolicy::default();
        assert!(policy.allows_filename("holiday.tar.GIF"));
        assert!(!policy.allows_filename("photo.png.exe"));
        assert!(!policy.allows_filename("png"));
        assert!(!policy.allows_filename(".png"));
    }

    #[test]
    fn split_extension_handles_edge_cases() {
        assert_eq!(split_extension("cat.png"), ("cat", Some("png")));
        assert_eq!(split_extension("a.b.c"), ("a.b", Some("c")));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing", Some("")));
    }
}
