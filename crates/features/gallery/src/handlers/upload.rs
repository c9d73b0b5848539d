use crate::error::GalleryError;
use crate::multipart::{boundary_from_content_type, extract, first_file};
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use sbox_storage::Storage;
use tracing::info;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// `POST /upload`: stores the first file part of a `multipart/form-data` body.
///
/// The declared length is checked against the policy before any body byte is read,
/// and the read itself is capped at that length.
pub(crate) async fn upload(
    State(storage): State<Storage>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, GalleryError> {
    let max = storage.policy().max_file_size;

    let content_type =
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if !content_type.to_ascii_lowercase().contains(MULTIPART_FORM_DATA) {
        return Err(GalleryError::MalformedRequest {
            message: "Invalid content type".into(),
            context: Some(content_type.to_owned().into()),
        });
    }

    let declared = declared_length(&headers);
    if declared > max {
        return Err(GalleryError::PayloadTooLarge {
            message: format!("Declared {declared} bytes, limit is {max}").into(),
            context: None,
        });
    }
    if declared == 0 {
        return Err(GalleryError::MalformedRequest { message: "No content".into(), context: None });
    }

    let boundary = boundary_from_content_type(content_type)?;

    let limit = usize::try_from(declared).unwrap_or(usize::MAX);
    let body = to_bytes(body, limit).await.map_err(|e| GalleryError::MalformedRequest {
        message: "Error reading request".into(),
        context: Some(e.to_string().into()),
    })?;

    let part = first_file(extract(&body, boundary))?;
    let size = u64::try_from(part.content.len()).unwrap_or(u64::MAX);
    if size > max {
        return Err(GalleryError::PayloadTooLarge {
            message: format!("File holds {size} bytes, limit is {max}").into(),
            context: None,
        });
    }

    let stored = storage.store(part.filename().unwrap_or_default(), part.content).await?;
    info!(filename = %stored.filename, bytes = stored.size, "Upload stored");

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "Upload successful"))
}

/// A missing or unparsable `Content-Length` counts as zero.
fn declared_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn declared_length_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), 0);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1024"));
        assert_eq!(declared_length(&headers), 1024);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert_eq!(declared_length(&headers), 0);
    }
}
