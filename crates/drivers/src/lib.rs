//! HTTP transport over the picrate task engine.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use picrate_application::ApplicationService;

pub mod api;

/// Shared across handlers; the engine's internal lock does the serializing.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ApplicationService>,
}

impl AppState {
    pub fn new(service: Arc<ApplicationService>) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/bootstrap", get(api::bootstrap))
        .route("/api/directory-tree", get(api::directory_tree))
        .route("/api/tasks", get(api::list_tasks).post(api::create_task))
        .route("/api/tasks/:name/next", get(api::next_image))
        .route("/api/tasks/:name/annotate", post(api::annotate))
        .route("/api/tasks/:name/image", get(api::image_bytes))
        .with_state(state)
}
