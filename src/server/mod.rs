//! HTTP front-end: an upload page, a multipart analysis endpoint and a
//! download endpoint, all bound to a single analysis session.

pub mod handlers;
pub mod page;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::AnalysisSession;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub struct AppState {
    /// Requests are served one at a time against this session.
    pub session: Mutex<AnalysisSession>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(session: AnalysisSession, max_upload_bytes: usize) -> Self {
        Self {
            session: Mutex::new(session),
            max_upload_bytes,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/report", get(handlers::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
