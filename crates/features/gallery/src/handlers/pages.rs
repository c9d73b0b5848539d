use crate::error::GalleryError;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use sbox_domain::config::AppConfig;
use sbox_domain::constants::{FAVICON, INDEX_PAGE, SLIDESHOW_PAGE};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

const HTML: &str = "text/html; charset=utf-8";
const ICON: &str = "image/x-icon";

pub(crate) async fn index(State(config): State<AppConfig>) -> Result<Response, GalleryError> {
    static_file(&config.storage.static_dir.join(INDEX_PAGE), HTML).await
}

pub(crate) async fn slideshow(State(config): State<AppConfig>) -> Result<Response, GalleryError> {
    static_file(&config.storage.static_dir.join(SLIDESHOW_PAGE), HTML).await
}

/// A missing icon is answered with `204 No Content` instead of an error.
pub(crate) async fn favicon(State(config): State<AppConfig>) -> Result<Response, GalleryError> {
    match static_file(&config.storage.static_dir.join(FAVICON), ICON).await {
        Err(GalleryError::NotFound { .. }) => Ok(StatusCode::NO_CONTENT.into_response()),
        other => other,
    }
}

async fn static_file(path: &Path, content_type: &'static str) -> Result<Response, GalleryError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(GalleryError::NotFound {
            message: path.display().to_string().into(),
            context: None,
        }),
        Err(e) => Err(GalleryError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to read {}", path.display()).into()),
        }),
    }
}
