use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;

/// Shared handles constructed once at startup and injected into every
/// handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: PgPool, config: Arc<Config>) -> Self {
        Self {
            db,
            config,
            http: reqwest::Client::new(),
        }
    }
}
