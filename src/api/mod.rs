pub mod health;
pub mod import;
pub mod positions;
pub mod transactions;

use crate::config::Config;
use crate::db::Repository;
use crate::orchestration::Recomputer;
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Upload size cap per staged file.
pub const MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Request body ceiling. Well above the per-file cap so a multi-file
/// import is limited file by file, not by the multipart envelope.
const MAX_IMPORT_BODY: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub recomputer: Recomputer,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let recomputer = Recomputer::new(Arc::clone(&repo));
        Self {
            repo,
            recomputer,
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/v1/positions", get(positions::get_positions))
        .route(
            "/v1/transactions",
            get(transactions::get_transactions).post(transactions::create_transaction),
        )
        .route(
            "/v1/transactions/:id",
            axum::routing::delete(transactions::delete_transaction),
        )
        .route("/v1/import", post(import::import_transactions))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BODY))
        .layer(cors)
        .with_state(state)
}
