use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use picrate_application::ApplicationError;
use serde_json::json;

/// Maps the engine's error taxonomy onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ApplicationError::Domain(_) | ApplicationError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::Conflict(_) => StatusCode::CONFLICT,
            ApplicationError::CorruptData(_)
            | ApplicationError::Io(_)
            | ApplicationError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
