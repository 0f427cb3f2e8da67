use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub type Result<T> = std::result::Result<T, AppError>;

/// Everything a shorten or redirect request can fail with.
///
/// Core code only returns these; logging happens once, when the handler turns
/// the error into a response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("original URL is missing or empty")]
    InvalidInput,

    #[error("no URL pair for alias '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("no free alias found after {attempts} attempts")]
    AliasSpaceExhausted { attempts: u32 },

    #[error("stored URL cannot be used as a redirect target: {0:?}")]
    InvalidRedirect(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_)
            | AppError::AliasSpaceExhausted { .. }
            | AppError::InvalidRedirect(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::InvalidInput => "URL is required",
            AppError::NotFound(_) => "Short link not found",
            AppError::Storage(_) => "Error accessing database",
            AppError::AliasSpaceExhausted { .. } => "Error shortening the URL",
            AppError::InvalidRedirect(_) => "Error redirecting",
        };

        if status.is_server_error() {
            tracing::error!("{status}: {:?}", self);
        } else {
            tracing::debug!("{status}: {}", self);
        }

        (status, body).into_response()
    }
}
