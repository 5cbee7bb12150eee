use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::ramal::resolve::ResolveError;

pub mod api;

#[derive(Serialize)]
struct ErrorView {
    error: String,
}

/// Renders an error message as a json body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorView { error: message.into() })).into_response()
}

pub struct WebError {
    status: StatusCode,
    error: anyhow::Error,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {:?}", self.error);
        }

        error_response(self.status, format!("{:#}", self.error))
    }
}

impl From<ResolveError> for WebError {
    fn from(err: ResolveError) -> Self {
        let status = match err {
            ResolveError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ResolveError::MalformedIdentifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        WebError { status, error: err.into() }
    }
}
