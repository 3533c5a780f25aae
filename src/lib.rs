pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod videos;

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpResponse;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use db::{DbOperations, Video};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Route index served at /docs, the place the interactive docs page
/// used to live.
pub async fn api_docs() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "title": "Video Metadata Service",
        "description": "CRUD API for video records with automatic view counting.",
        "routes": {
            "GET /health": "service status",
            "GET /videos": "paginated listing (page, page_size, sort_by=views|title|created_at)",
            "GET /videos/search": "search title, name, or script (q, page, page_size)",
            "GET /videos/featured": "random selection (count)",
            "GET /videos/{id}": "fetch one record and count the view",
            "POST /videos": "create a record",
            "PUT /videos/{id}": "update supplied fields",
            "DELETE /videos/{id}": "remove a record"
        }
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: Arc<DbOperations>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        // Initialize database connection pool
        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?;

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        self.db.pool().close().await;

        Ok(())
    }
}
