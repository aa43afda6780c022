use axum::extract::{Query, State};
use axum::Json;
use picrate_application::{BootstrapQuery, BootstrapView, DirectoryTreeQuery, DirectoryTreeView};
use serde::Deserialize;

use crate::api::ApiError;
use crate::AppState;

/// GET /api/bootstrap
pub async fn bootstrap(State(state): State<AppState>) -> Result<Json<BootstrapView>, ApiError> {
    let view = state.service.bootstrap(BootstrapQuery)?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub path: String,
}

/// GET /api/directory-tree?path=...
pub async fn directory_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<DirectoryTreeView>, ApiError> {
    let view = state
        .service
        .directory_tree(DirectoryTreeQuery { path: query.path })?;
    Ok(Json(view))
}
