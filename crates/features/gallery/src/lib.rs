//! Gallery feature slice.
//!
//! Parses uploads without a MIME library, hands untrusted names to [`sbox_storage`] and
//! serves pictures back through its path guard.
//!
//! ```rust
//! use sbox_gallery::multipart::{extract, first_file};
//!
//! let body = b"--xyz\r\nContent-Disposition: form-data; name=\"f\"; filename=\"cat.png\"\r\n\r\nPNG\r\n--xyz--\r\n";
//! let part = first_file(extract(body, "xyz")).unwrap();
//! assert_eq!(part.filename(), Some("cat.png"));
//! assert_eq!(part.content, b"PNG");
//! ```

pub mod decode;
mod error;
pub mod multipart;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod router;

pub use error::{GalleryError, GalleryErrorExt};
#[cfg(feature = "server")]
pub use router::gallery_router;
