use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[sbox_derive::sbox_error]
pub enum StorageError {
    #[error("Directory not found{}: {message}", format_context(.context))]
    DirectoryNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The path (lexically or after canonicalization) lies outside the storage root.
    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File type not allowed{}: {message}", format_context(.context))]
    DisallowedFileType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No free filename{}: {message}", format_context(.context))]
    TooManyCollisions { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
