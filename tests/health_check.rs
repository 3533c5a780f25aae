use actix_web::{test, web, App};
use chrono::DateTime;
use quipvid_server::{api_docs, health_check, AppState, DbOperations, Settings};
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

fn test_state() -> web::Data<AppState> {
    let config = Settings::new().expect("Failed to load test config");
    // Lazy pool: these routes never touch the database
    let pool = MySqlPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to create lazy pool");

    web::Data::new(AppState {
        config: Arc::new(config),
        db: Arc::new(DbOperations::new(Arc::new(pool))),
    })
}

#[actix_web::test]
async fn test_health_check() {
    let state = test_state();

    // Create test app
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(health_check)),
    )
    .await;

    // Send request
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    // Assert response
    assert!(resp.status().is_success());

    // Parse response body
    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Verify response format
    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn test_docs_lists_video_routes() {
    let state = test_state();

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/docs", web::get().to(api_docs)),
    )
    .await;

    let req = test::TestRequest::get().uri("/docs").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["title"], "Video Metadata Service");
    assert!(json["routes"].get("GET /videos").is_some());
    assert!(json["routes"].get("GET /videos/{id}").is_some());
}
