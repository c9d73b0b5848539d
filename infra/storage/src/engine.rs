//! Core picture store: exclusive, never-overwriting writes and guarded reads.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::guard::PathGuard;
use crate::maintenance::{self, TMP_MARKER};
use crate::resolver::{FilenameResolver, ResolvedUpload, SanitizedName};
use sbox_domain::policy::UploadPolicy;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A picture persisted under the storage root. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path of the storage root.
    pub(crate) root: PathBuf,
    pub(crate) policy: UploadPolicy,
    /// A unique counter used to generate staging file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the picture store.
///
/// Every write goes through the [`FilenameResolver`] and every read through the
/// [`PathGuard`]; both compare against the canonical root captured at
/// [`StorageBuilder::connect`].
///
/// This handle is internally reference-counted (`Arc`) and can be cheaply cloned
/// across tasks.
///
/// # Example
///
/// ```rust
/// use sbox_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("pictures");
///     let storage = Storage::builder().root(&root).connect().await?;
///
///     let first = storage.store("../../cat.png", b"meow").await?;
///     let second = storage.store("cat.png", b"purr").await?;
///     assert_eq!(first.filename, "cat.png");
///     assert_eq!(second.filename, "cat_1.png");
///
///     let path = storage.authorize(["cat.png"])?;
///     assert_eq!(storage.read(&path).await?, b"meow");
///     assert_eq!(storage.list_images().await?, ["cat.png", "cat_1.png"]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    #[must_use]
    pub fn resolver(&self) -> FilenameResolver<'_> {
        FilenameResolver::new(&self.root, &self.policy)
    }

    #[must_use]
    pub fn guard(&self) -> PathGuard<'_> {
        PathGuard::new(&self.root, &self.policy)
    }

    /// Check-then-act resolution of an untrusted filename. See [`FilenameResolver::resolve`].
    pub fn resolve_upload(&self, raw_filename: &str) -> Result<ResolvedUpload, StorageError> {
        self.resolver().resolve(raw_filename)
    }

    /// Authorizes decoded path segments for reading. See [`PathGuard::authorize`].
    pub fn authorize<I, S>(&self, segments: I) -> Result<PathBuf, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.guard().authorize(segments)
    }

    /// Persists `content` under a safe name derived from `raw_filename`.
    ///
    /// 1. The name is sanitized and checked before anything touches the disk.
    /// 2. Content goes to a hidden staging file in the root and is `fsync`ed.
    /// 3. The staging file is hard-linked to the first free candidate name. A link
    ///    never replaces an existing entry, so a concurrent upload of the same name
    ///    gets `AlreadyExists` and moves on to the next numeric suffix.
    /// 4. The staging file is removed whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DisallowedFileType`] for non-image names,
    /// [`StorageError::TooManyCollisions`] when every candidate is taken,
    /// [`StorageError::PathTraversalAttempt`] if a candidate escapes the root, and
    /// [`StorageError::Io`] for disk failures.
    pub async fn store(
        &self,
        raw_filename: &str,
        content: &[u8],
    ) -> Result<StoredImage, StorageError> {
        let resolver = self.resolver();
        let name = resolver.sanitize(raw_filename)?;

        let staging = self.write_staging(content).await?;
        let outcome = self.link_first_free(&resolver, &name, &staging).await;

        discard_staging(&staging).await;

        let (filename, path) = outcome?;
        Self::sync_dir(&self.root).await;

        debug!(path = %path.display(), bytes = content.len(), "Picture stored");
        Ok(StoredImage { filename, path, size: content.len() as u64 })
    }

    async fn link_first_free(
        &self,
        resolver: &FilenameResolver<'_>,
        name: &SanitizedName,
        staging: &Path,
    ) -> Result<(String, PathBuf), StorageError> {
        for attempt in 0..self.policy.max_collision_attempts {
            let filename = resolver.candidate(name, attempt);
            if resolver.is_taken(&filename) {
                continue;
            }
            let path = resolver.locate(&filename)?;

            match fs::hard_link(staging, &path).await {
                Ok(()) => return Ok((filename, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(filename = %filename, "Lost creation race, trying next suffix");
                },
                Err(e) => {
                    return Err(e).context(format!("Failed to publish {}", path.display()));
                },
            }
        }

        Err(resolver.exhausted(name))
    }

    async fn write_staging(&self, content: &[u8]) -> Result<PathBuf, StorageError> {
        loop {
            let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
            let path = self.root.join(format!(".{}.{counter}{TMP_MARKER}", std::process::id()));

            let mut file =
                match fs::OpenOptions::new().create_new(true).write(true).open(&path).await {
                    Ok(file) => file,
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                    Err(e) => {
                        return Err(e)
                            .context(format!("Staging file creation failed: {}", path.display()));
                    },
                };

            let written = async {
                file.write_all(content).await.context("Write failed")?;
                file.sync_all().await.context("Hardware sync failed")
            }
            .await;

            if let Err(e) = written {
                drop(file);
                discard_staging(&path).await;
                return Err(e);
            }

            return Ok(path);
        }
    }

    /// Reads a path previously returned by [`Storage::authorize`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path is missing or not a regular file,
    /// [`StorageError::Io`] for other read failures.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {},
            Ok(_) => {
                return Err(StorageError::FileNotFound {
                    message: path.display().to_string().into(),
                    context: Some("Not a regular file".into()),
                });
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: path.display().to_string().into(),
                    context: None,
                });
            },
            Err(e) => {
                return Err(e).context(format!("Failed to stat {}", path.display()));
            },
        }

        fs::read(path).await.context(format!("Read failed: {}", path.display()))
    }

    /// Lists regular files directly under the root that carry an allowed extension,
    /// sorted lexicographically. A missing root yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root exists but cannot be read.
    pub async fn list_images(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.clone();
        let policy = self.policy.clone();

        tokio::task::spawn_blocking(move || collect_images(&root, &policy))
            .await
            .map_err(|e| StorageError::Io {
                source: std::io::Error::other(e),
                context: Some("Listing task failed".into()),
            })?
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

/// Removes a staging file, logging instead of failing. Returns whether it was removed.
async fn discard_staging(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to remove staging file");
            false
        },
    }
}

fn collect_images(root: &Path, policy: &UploadPolicy) -> Result<Vec<String>, StorageError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| StorageError::Io {
            source: e.into(),
            context: Some(format!("Failed to list {}", root.display()).into()),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && policy.allows_filename(name)
            && !maintenance::is_tmp_name(name)
        {
            images.push(name.to_owned());
        }
    }

    images.sort_unstable();
    Ok(images)
}
