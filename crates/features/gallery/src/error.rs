use sbox_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`GalleryError`] enum of this crate.
#[sbox_derive::sbox_error]
pub enum GalleryError {
    /// Wrong content type, missing length or an unusable boundary.
    #[error("Malformed request{}: {message}", format_context(.context))]
    MalformedRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No file uploaded{}: {message}", format_context(.context))]
    NoFileFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Empty file{}: {message}", format_context(.context))]
    EmptyFile { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Payload too large{}: {message}", format_context(.context))]
    PayloadTooLarge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A read was refused by the path guard.
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A static page is absent.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal gallery error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl GalleryError {
    /// Re-labels guard rejections of a read request as [`GalleryError::Forbidden`].
    ///
    /// Uploads report a disallowed type as a client error, reads as a refusal.
    #[must_use]
    pub fn on_read(self) -> Self {
        match self {
            Self::Storage {
                source:
                    source @ (StorageError::PathTraversalAttempt { .. }
                    | StorageError::DisallowedFileType { .. }),
                ..
            } => Self::Forbidden { message: source.to_string().into(), context: None },
            other => other,
        }
    }

    /// Short diagnostic returned to the client.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "Invalid request",
            Self::NoFileFound { .. } => "No file uploaded",
            Self::EmptyFile { .. } => "Empty file",
            Self::PayloadTooLarge { .. } => "File too large",
            Self::Forbidden { .. } => "Forbidden",
            Self::NotFound { .. } => "Not found",
            Self::Storage { source, .. } => match source {
                StorageError::DisallowedFileType { .. } => {
                    "Invalid file type. Only images are allowed."
                },
                StorageError::PathTraversalAttempt { .. } => "Forbidden",
                StorageError::FileNotFound { .. } => "Not found",
                StorageError::TooManyCollisions { .. } => "Too many duplicate files",
                StorageError::DirectoryNotFound { .. } | StorageError::Io { .. } => {
                    "Storage failure"
                },
            },
            Self::Internal { .. } => "Internal server error",
        }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::GalleryError;
    use axum::http::{StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use sbox_storage::StorageError;

    impl GalleryError {
        #[must_use]
        pub const fn status_code(&self) -> StatusCode {
            match self {
                Self::MalformedRequest { .. } | Self::NoFileFound { .. } | Self::EmptyFile { .. } => {
                    StatusCode::BAD_REQUEST
                },
                Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                Self::Forbidden { .. } => StatusCode::FORBIDDEN,
                Self::NotFound { .. } => StatusCode::NOT_FOUND,
                Self::Storage { source, .. } => match source {
                    StorageError::DisallowedFileType { .. } => StatusCode::BAD_REQUEST,
                    StorageError::PathTraversalAttempt { .. } => StatusCode::FORBIDDEN,
                    StorageError::FileNotFound { .. } => StatusCode::NOT_FOUND,
                    StorageError::TooManyCollisions { .. }
                    | StorageError::DirectoryNotFound { .. }
                    | StorageError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                },
                Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for GalleryError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                tracing::error!(kind = self.kind(), error = %self, "Request failed");
            } else {
                tracing::warn!(kind = self.kind(), status = status.as_u16(), error = %self, "Request rejected");
            }

            (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], self.public_message())
                .into_response()
        }
    }
}
