use axum::Router;
use sbox_gallery::gallery_router;
use sbox_kernel::server::{AppState, system_router};
use tower_http::trace::TraceLayer;

pub(crate) fn init(state: AppState) -> Router {
    Router::new()
        .merge(gallery_router())
        .merge(system_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
