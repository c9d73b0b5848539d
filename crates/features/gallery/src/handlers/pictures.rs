use crate::decode::percent_decode;
use crate::error::GalleryError;
use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use sbox_storage::Storage;

const PICTURES_PREFIX: &str = "/pictures/";

/// `GET /pictures/<encoded-path>`.
///
/// Works on the raw request path: every segment is percent-decoded on its own, so an
/// encoded separator stays inside its segment and is refused by the guard.
pub(crate) async fn serve_picture(
    State(storage): State<Storage>,
    uri: Uri,
) -> Result<Response, GalleryError> {
    let requested = uri.path().strip_prefix(PICTURES_PREFIX).unwrap_or_default();
    let segments: Vec<String> = requested.split('/').map(percent_decode).collect();

    let path = storage.authorize(&segments).map_err(|e| GalleryError::from(e).on_read())?;
    let bytes = storage.read(&path).await?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_owned()),
        ],
        bytes,
    )
        .into_response())
}
