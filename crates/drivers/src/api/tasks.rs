use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use picrate_application::{
    AnnotateCommand, ApplicationError, CreateTaskCommand, ListTasksQuery, NextImageQuery,
    NextImageView,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::ApiError;
use crate::AppState;

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let listing = state.service.list_tasks(ListTasksQuery)?;
    for discarded in &listing.discarded {
        warn!(
            "skipping unreadable task file {}: {}",
            discarded.name, discarded.reason
        );
    }
    Ok(Json(json!({ "tasks": listing.tasks })))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub directories: Vec<String>,
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let summary = state.service.create_task(CreateTaskCommand {
        name: request.name,
        directories: request.directories,
    })?;
    info!(
        "created task {} ({} images from {} directories)",
        summary.name,
        summary.total,
        summary.directories.len()
    );
    Ok((StatusCode::CREATED, Json(json!({ "task": summary }))))
}

/// GET /api/tasks/:name/next
pub async fn next_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<NextImageView>, ApiError> {
    let view = state.service.next_image(NextImageQuery { task: name })?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    #[serde(default)]
    pub image: String,
    /// Taken as loose JSON so a fractional or stringly rating is rejected as
    /// a 400, not a deserialization failure.
    pub rating: Option<Value>,
}

/// POST /api/tasks/:name/annotate
pub async fn annotate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<Value>, ApiError> {
    let rating = request
        .rating
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            ApiError::from(ApplicationError::InvalidInput(
                "rating must be an integer between 1 and 5".to_string(),
            ))
        })?;
    let outcome = state.service.annotate(AnnotateCommand {
        task: name.clone(),
        image: request.image,
        rating,
    })?;
    info!(
        "annotated image in task {} ({}/{} done)",
        name, outcome.completed, outcome.total
    );
    Ok(Json(json!({
        "status": "ok",
        "completed": outcome.completed,
        "total": outcome.total,
    })))
}
