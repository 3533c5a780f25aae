//! Request validation behavior of the video routes. Every request here is
//! rejected before any query runs, so the pool is built lazily and no
//! database is needed.

use actix_web::{test, web, App};
use quipvid_server::videos::handlers::{
    create_video, delete_video, featured_videos, get_video, list_videos, search_videos,
    update_video,
};
use quipvid_server::{AppState, DbOperations, Settings};
use serde_json::json;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

fn test_state() -> web::Data<AppState> {
    let config = Settings::new().expect("Failed to load test config");
    let pool = MySqlPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to create lazy pool");

    web::Data::new(AppState {
        config: Arc::new(config),
        db: Arc::new(DbOperations::new(Arc::new(pool))),
    })
}

macro_rules! video_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .route("/videos/search", web::get().to(search_videos))
                .route("/videos/featured", web::get().to(featured_videos))
                .route("/videos", web::get().to(list_videos))
                .route("/videos", web::post().to(create_video))
                .route("/videos/{id}", web::get().to(get_video))
                .route("/videos/{id}", web::put().to(update_video))
                .route("/videos/{id}", web::delete().to(delete_video)),
        )
        .await
    };
}

fn error_message(body: &[u8]) -> String {
    let json: serde_json::Value = serde_json::from_slice(body).unwrap();
    json["error"]["message"].as_str().unwrap_or_default().to_string()
}

#[actix_web::test]
async fn test_list_rejects_page_zero() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::get().uri("/videos?page=0").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(error_message(&body).contains("page must be at least 1"));
}

#[actix_web::test]
async fn test_list_rejects_oversized_page() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::get()
        .uri("/videos?page_size=101")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(error_message(&body).contains("page_size"));
}

#[actix_web::test]
async fn test_list_rejects_unknown_sort_field() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::get()
        .uri("/videos?sort_by=rating")
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Rejected by query deserialization
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_search_requires_query() {
    let state = test_state();
    let app = video_app!(state);

    // Missing q entirely
    let req = test::TestRequest::get().uri("/videos/search").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Whitespace-only q
    let req = test::TestRequest::get()
        .uri("/videos/search?q=%20%20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(error_message(&body).contains("q must not be empty"));
}

#[actix_web::test]
async fn test_featured_rejects_out_of_range_count() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::get()
        .uri("/videos/featured?count=0")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/videos/featured?count=51")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_update_rejects_empty_payload() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::put()
        .uri("/videos/abc123")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(error_message(&body).contains("No fields provided for update"));
}

#[actix_web::test]
async fn test_update_rejects_empty_required_field() {
    let state = test_state();
    let app = video_app!(state);

    let req = test::TestRequest::put()
        .uri("/videos/abc123")
        .set_json(json!({"title": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(error_message(&body).contains("title"));
}

#[actix_web::test]
async fn test_create_rejects_missing_required_fields() {
    let state = test_state();
    let app = video_app!(state);

    // No title
    let req = test::TestRequest::post()
        .uri("/videos")
        .set_json(json!({
            "url": "https://quipvid.com/v/abc",
            "name": "Airplane!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Rejected by payload deserialization
    assert_eq!(resp.status(), 400);
}
