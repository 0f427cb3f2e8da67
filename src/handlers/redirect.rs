use crate::{
    error::{AppError, Result},
    shortener, AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, CONTROLS};
use std::sync::Arc;

/// GET /s/:alias
///
/// 302 to the original URL, or 404 if no pair uses `alias`.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(alias): Path<String>,
) -> Result<Response> {
    // Nothing outside the alias alphabet/length was ever issued.
    if !shortener::is_alias(&alias) {
        return Err(AppError::NotFound(alias));
    }

    let original_url = state
        .store
        .find_by_alias(&alias)
        .await?
        .ok_or(AppError::NotFound(alias))?;

    let location = location_header(&original_url)?;

    // axum's `Redirect` only offers 303/307/308.
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Stored URLs are arbitrary strings; control characters and non-ASCII bytes
/// are percent-encoded so every one of them fits in a `Location` header.
fn location_header(url: &str) -> Result<HeaderValue> {
    let encoded = utf8_percent_encode(url, CONTROLS).to_string();
    HeaderValue::try_from(encoded).map_err(|_| AppError::InvalidRedirect(url.to_owned()))
}
