pub mod compare;
pub mod health;
pub mod history;
pub mod proxy;

use crate::history::HistoryStore;
use crate::proxy::ProxyService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared handler state, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<dyn ProxyService>,
    pub store: Arc<dyn HistoryStore>,
    /// Header carrying the authenticated owner id.
    pub owner_header: String,
}

impl AppState {
    pub fn new(
        proxy: Arc<dyn ProxyService>,
        store: Arc<dyn HistoryStore>,
        owner_header: impl Into<String>,
    ) -> Self {
        Self {
            proxy,
            store,
            owner_header: owner_header.into(),
        }
    }
}

/// API routes, without middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/proxy", post(proxy::proxy_request))
        .route("/api/history", get(history::list_history))
        .route("/api/history/:id", get(history::get_history))
        .route("/api/history/:id/analysis", get(history::analyze_history))
        .route("/api/compare", post(compare::compare_responses))
        .with_state(state)
}
