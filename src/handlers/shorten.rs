use crate::{
    error::{AppError, Result},
    AppState,
};
use axum::extract::{Form, State};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ShortenForm {
    #[serde(default)]
    url: String,
}

/// POST /shorten
///
/// Form field `url` → alias as a plain-text body. The same URL always gets
/// the same alias back.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShortenForm>,
) -> Result<String> {
    if form.url.is_empty() {
        return Err(AppError::InvalidInput);
    }

    let alias = state.shortener.shorten(&form.url).await?;
    tracing::info!("Shortened '{}' -> {}", form.url, alias);

    Ok(alias)
}
