use crate::handlers;
use axum::Router;
use axum::routing::{get, post};
use sbox_kernel::server::AppState;

/// Public surface of the gallery: pages, picture listing, serving and uploads.
pub fn gallery_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/slideshow", get(handlers::slideshow))
        .route("/favicon.ico", get(handlers::favicon))
        .route("/api/images", get(handlers::list_images))
        .route("/pictures/{*path}", get(handlers::serve_picture))
        .route("/upload", post(handlers::upload))
}
