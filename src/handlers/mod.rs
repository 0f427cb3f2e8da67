pub mod pages;
pub mod redirect;
pub mod shorten;

use crate::AppState;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Build the full application router around `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let ui = ServeDir::new(&state.config.ui_dir);

    Router::new()
        .route("/", get(pages::front_page))
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/shorten", post(shorten::shorten))
        .route("/s/:alias", get(redirect::redirect))
        // Static assets referenced by the front page
        .nest_service("/UI", ui)
        // Any other path gets the front page
        .fallback(pages::front_page)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
