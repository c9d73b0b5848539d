//! A sandboxed picture store.
//!
//! It owns every filesystem decision the server makes about user-controlled names.
//! All examples use temporary directories to avoid writing to the real filesystem.
//!
//! # Core Features
//!
//! - **Filename Resolution**: Untrusted client filenames are reduced to a basename, stripped of
//!   NUL bytes and hidden-file prefixes, length-bounded, checked against the extension allow-list,
//!   and de-duplicated with numeric suffixes (`photo.jpg`, `photo_1.jpg`, ...).
//! - **No Overwrites**: Uploads are staged, `fsync`ed, and published with a hard link, which fails
//!   instead of replacing an existing file. Concurrent uploads of one name get distinct suffixes.
//! - **Path Guard**: Read requests are canonicalized and must stay under the canonical root and
//!   name an allowed image type.
//! - **Self-Healing**: Abandoned staging files are purged during initialization.
//!
//! # Architectural Overview
//!
//! 1.  **[`Storage`]**: The primary thread-safe handle and entry point.
//! 2.  **[`FilenameResolver`]**: Write-side name pipeline.
//! 3.  **[`PathGuard`]**: Read-side authorization.
//! 4.  **[`StorageBuilder`]**: A type-safe fluent builder for configuration.
//!
//! # Examples
//!
//! ```rust
//! use sbox_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("pictures");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!
//!     let stored = storage.store("holiday.JPG", b"jpeg bytes").await?;
//!     assert_eq!(stored.filename, "holiday.JPG");
//!
//!     assert!(storage.authorize(["..", "etc", "passwd"]).is_err());
//!     assert!(matches!(storage.store("shell.exe", b"MZ").await, Err(StorageError::DisallowedFileType { .. })));
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod guard;
mod maintenance;
mod resolver;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Storage, StoredImage};
pub use error::{StorageError, StorageErrorExt};
pub use guard::PathGuard;
pub use resolver::{FilenameResolver, ResolvedUpload, SanitizedName, bound_length, sanitize_filename};
