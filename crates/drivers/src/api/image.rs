use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use picrate_application::{ApplicationError, FetchImageQuery};
use serde::Deserialize;

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub token: String,
}

/// GET /api/tasks/:name/image?token=...
///
/// Streams the raw file bytes after the engine has authorized the decoded
/// path against the task's image set.
pub async fn image_bytes(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    if query.token.is_empty() {
        return Err(ApplicationError::InvalidInput("image token is required".to_string()).into());
    }
    let contents = state.service.fetch_image(FetchImageQuery {
        task: name,
        token: query.token,
    })?;
    let content_type = content_type_for(&contents.path);
    Ok(([(header::CONTENT_TYPE, content_type)], contents.bytes).into_response())
}

fn content_type_for(path: &str) -> &'static str {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
