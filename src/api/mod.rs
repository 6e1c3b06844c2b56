pub mod routes;
pub mod models;
pub mod errors;

use std::path::Path;
use axum::Router;
use tower_http::trace::TraceLayer;
use crate::db::{Collections, Database};
use crate::errors::CacheError;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn create_app_state(db_path: &Path, collections: Collections) -> Result<AppState, CacheError> {
    let db = Database::new(db_path, collections)?;
    Ok(AppState { db })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(routes::health::health_check))
        .route("/api/lookup", axum::routing::post(routes::lookup::lookup))
        .route("/api/update", axum::routing::post(routes::update::update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
