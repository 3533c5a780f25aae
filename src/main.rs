use actix_web::{web, App, HttpResponse, HttpServer};
use actix_cors::Cors;
use dotenv::dotenv;
use quipvid_server::videos::handlers::{
    create_video, delete_video, featured_videos, get_video, list_videos, search_videos,
    update_video,
};
use quipvid_server::{api_docs, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Health check endpoint handler
/// Returns a JSON response with server status and connection pool counts
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let pool = state.db.get_pool_status().await;

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": {
            "total_connections": pool.total_connections,
            "active_connections": pool.active_connections,
            "idle_connections": pool.idle_connections,
        },
    }))
}

#[actix_web::main]
async fn main() -> quipvid_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!("Starting server at {}:{}", config.server.host, config.server.port);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;

    // Create the videos table on a fresh database
    state.db.ensure_schema().await?;
    info!("Database schema ready");

    let state = web::Data::new(state);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    info!(
        "Video API ready at http://{}:{} (docs at /docs)",
        config.server.host, config.server.port
    );

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            // Apply specific CORS rules based on configuration
            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_any_header()
            } else {
                // More restrictive CORS for production use
                cors_config
                    .allowed_origin("http://localhost:8003")
                    .allowed_origin("http://127.0.0.1:8003")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            // Set max age
            cors_config.max_age(config.cors.max_age as usize)
        } else {
            // CORS disabled - use most restrictive settings
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/docs", web::get().to(api_docs))
            // Literal paths must come before /videos/{id}
            .route("/videos/search", web::get().to(search_videos))
            .route("/videos/featured", web::get().to(featured_videos))
            .route("/videos", web::get().to(list_videos))
            .route("/videos", web::post().to(create_video))
            .route("/videos/{id}", web::get().to(get_video))
            .route("/videos/{id}", web::put().to(update_video))
            .route("/videos/{id}", web::delete().to(delete_video))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
