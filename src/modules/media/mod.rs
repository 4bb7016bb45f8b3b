use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};

pub mod dto;
pub mod handler;
pub mod service;

// Large enough for source videos; axum's 2 MB default is not.
const UPLOAD_BODY_LIMIT: usize = 512 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/status/{video_key}", get(handler::check_status))
        .route("/download/{key}", get(handler::download));

    let protected_routes = Router::new()
        .route("/upload", post(handler::upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware,
        ));

    public_routes.merge(protected_routes)
}
