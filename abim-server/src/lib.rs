//! abim-server library — Audited Body Import service.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod db;
pub mod importer;
pub mod store;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Anti-forgery token import requests must carry; empty disables
    /// checking
    pub import_token: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: SqlitePool, import_token: String) -> Self {
        Self { db, import_token }
    }
}

/// Build application router.
///
/// Import routes sit behind the token middleware; the health endpoint does
/// not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::post;

    let protected = Router::new()
        .route("/api/import/row", post(api::import_row))
        .route("/api/import/file", post(api::import_file))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::token_middleware,
        ));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        // Enable CORS for local admin access
        .layer(CorsLayer::permissive())
        .with_state(state)
}
