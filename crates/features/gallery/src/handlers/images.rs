use crate::error::GalleryError;
use axum::Json;
use axum::extract::State;
use sbox_storage::Storage;

/// `GET /api/images`: sorted names of the pictures currently stored.
pub(crate) async fn list_images(
    State(storage): State<Storage>,
) -> Result<Json<Vec<String>>, GalleryError> {
    Ok(Json(storage.list_images().await?))
}
