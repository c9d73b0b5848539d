//! Minimal `multipart/form-data` splitting over a fully buffered body.
//!
//! Parts borrow from the body; nothing is copied except lossily decoded header text.

use crate::error::GalleryError;
use std::borrow::Cow;

const HEADER_END: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";
const DISPOSITION: &str = "content-disposition";
const FILENAME_ATTR: &str = "filename=";
const BOUNDARY_ATTR: &str = "boundary=";

/// One section of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart<'a> {
    pub header_text: Cow<'a, str>,
    pub content: &'a [u8],
}

impl MultipartPart<'_> {
    /// A part is a file candidate when its headers carry a disposition with a `filename=` attribute.
    #[must_use]
    pub fn is_file_candidate(&self) -> bool {
        let headers = self.header_text.to_ascii_lowercase();
        headers.contains(DISPOSITION) && headers.contains(FILENAME_ATTR)
    }

    /// The raw `filename=` attribute value, quoted or bare.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        let start = find_ignore_case(&self.header_text, FILENAME_ATTR)? + FILENAME_ATTR.len();
        let rest = self.header_text[start..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            quoted.split('"').next().unwrap_or_default()
        } else {
            rest.split([';', '\r', '\n']).next().unwrap_or_default().trim()
        };
        Some(value)
    }
}

/// Extracts the boundary token from a `Content-Type` header value.
///
/// Surrounding whitespace and double quotes are removed; parameters after the boundary are ignored.
pub fn boundary_from_content_type(content_type: &str) -> Result<&str, GalleryError> {
    let start = find_ignore_case(content_type, BOUNDARY_ATTR).ok_or_else(|| {
        GalleryError::MalformedRequest {
            message: "Invalid multipart boundary".into(),
            context: Some(content_type.to_owned().into()),
        }
    })? + BOUNDARY_ATTR.len();

    let boundary = content_type[start..]
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('"');

    if boundary.is_empty() {
        return Err(GalleryError::MalformedRequest {
            message: "Empty multipart boundary".into(),
            context: None,
        });
    }
    Ok(boundary)
}

/// Splits `body` on `--<boundary>` into parts.
///
/// Segments without a blank line between headers and content (the preamble and the
/// closing delimiter) are skipped. Exactly one trailing CRLF is removed from each part's content.
#[must_use]
pub fn extract<'a>(body: &'a [u8], boundary: &str) -> Vec<MultipartPart<'a>> {
    let delimiter = [b"--".as_slice(), boundary.as_bytes()].concat();

    split(body, &delimiter)
        .filter_map(|segment| {
            let header_end = find(segment, HEADER_END)?;
            let header_text = String::from_utf8_lossy(&segment[..header_end]);
            let content = &segment[header_end + HEADER_END.len()..];
            let content = content.strip_suffix(CRLF).unwrap_or(content);
            Some(MultipartPart { header_text, content })
        })
        .collect()
}

/// Picks the first file candidate. An empty candidate is an error, not skipped.
pub fn first_file<'a, I>(parts: I) -> Result<MultipartPart<'a>, GalleryError>
where
    I: IntoIterator<Item = MultipartPart<'a>>,
{
    let part = parts.into_iter().find(MultipartPart::is_file_candidate).ok_or_else(|| {
        GalleryError::NoFileFound { message: "No file-bearing part in body".into(), context: None }
    })?;

    if part.content.is_empty() {
        return Err(GalleryError::EmptyFile {
            message: part.filename().unwrap_or_default().to_owned().into(),
            context: None,
        });
    }
    Ok(part)
}

fn split<'a>(haystack: &'a [u8], needle: &[u8]) -> impl Iterator<Item = &'a [u8]> {
    let mut rest = Some(haystack);
    std::iter::from_fn(move || {
        let current = rest?;
        match find(current, needle) {
            Some(idx) => {
                rest = Some(&current[idx + needle.len()..]);
                Some(&current[..idx])
            },
            None => {
                rest = None;
                Some(current)
            },
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    find(haystack.to_ascii_lowercase().as_bytes(), needle.as_bytes())
}
