use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::models::{Video, VideoChanges};
use crate::db::operations::VideoSort;
use crate::error::AppError;
use crate::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_FEATURED_COUNT: u64 = 8;
const MAX_FEATURED_COUNT: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub sort_by: Option<VideoSort>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    pub count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct VideoCreate {
    pub url: String,
    pub name: String,
    pub title: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub user: Option<String>,
    pub poster: Option<String>,
    pub script: Option<String>,
}

/// Partial update payload. Absent fields are left untouched; a supplied
/// empty string clears a nullable column.
#[derive(Debug, Default, Deserialize)]
pub struct VideoUpdate {
    pub url: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub user: Option<String>,
    pub poster: Option<String>,
    pub script: Option<String>,
}

impl VideoUpdate {
    fn into_changes(self) -> Result<VideoChanges, AppError> {
        let changes = VideoChanges {
            url: required_field("url", self.url)?,
            name: required_field("name", self.name)?,
            title: required_field("title", self.title)?,
            image: self.image.map(normalize_empty),
            video: self.video.map(normalize_empty),
            user: self.user.map(normalize_empty),
            poster: self.poster.map(normalize_empty),
            script: self.script.map(normalize_empty),
        };

        if changes.is_empty() {
            return Err(AppError::ValidationError(
                "No fields provided for update".to_string(),
            ));
        }

        Ok(changes)
    }
}

fn normalize_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn required_field(name: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::ValidationError(format!(
            "Field '{}' cannot be empty",
            name
        ))),
        other => Ok(other),
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse {
    pub total: i64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub videos: Vec<Video>,
}

fn total_pages(total: i64, page_size: u64) -> u64 {
    (total as u64 + page_size - 1) / page_size
}

fn validate_paging(page: Option<u64>, page_size: Option<u64>) -> Result<(u64, u64), AppError> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(AppError::ValidationError(
            "page must be at least 1".to_string(),
        ));
    }
    if page_size < 1 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::ValidationError(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    Ok((page, page_size))
}

/// GET /videos - paginated listing, optionally sorted by views, title,
/// or creation time (the default).
pub async fn list_videos(
    params: web::Query<ListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (page, page_size) = validate_paging(params.page, params.page_size)?;
    let sort = params.sort_by.unwrap_or(VideoSort::CreatedAt);

    let total = state.db.count_videos().await?;
    let videos = state.db.list_videos(page, page_size, sort).await?;

    Ok(HttpResponse::Ok().json(PaginatedResponse {
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
        videos,
    }))
}

/// GET /videos/search - match against title, name, or script, most
/// viewed first.
pub async fn search_videos(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::ValidationError(
            "q must not be empty".to_string(),
        ));
    }
    let (page, page_size) = validate_paging(params.page, params.page_size)?;

    info!("Searching videos for '{}'", query);

    let total = state.db.count_search(query).await?;
    let videos = state.db.search_videos(query, page, page_size).await?;

    Ok(HttpResponse::Ok().json(PaginatedResponse {
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
        videos,
    }))
}

/// GET /videos/featured - a random selection for the front page strip.
pub async fn featured_videos(
    params: web::Query<FeaturedParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let count = params.count.unwrap_or(DEFAULT_FEATURED_COUNT);
    if count < 1 || count > MAX_FEATURED_COUNT {
        return Err(AppError::ValidationError(format!(
            "count must be between 1 and {}",
            MAX_FEATURED_COUNT
        )));
    }

    let videos = state.db.featured_videos(count).await?;
    Ok(HttpResponse::Ok().json(videos))
}

/// GET /videos/{id} - fetch one record and count the view.
pub async fn get_video(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    if !state.db.increment_views(&id).await? {
        warn!("Video {} not found", id);
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let video = state
        .db
        .get_video(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(video))
}

/// POST /videos - insert a new record with a generated id.
pub async fn create_video(
    payload: web::Json<VideoCreate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    let mut video = Video::new(payload.url, payload.name, payload.title);
    video.image = payload.image;
    video.video = payload.video;
    video.user = payload.user;
    video.poster = payload.poster;
    video.script = payload.script;

    state.db.insert_video(&video).await?;
    info!("Created video {} ('{}')", video.id, video.title);

    Ok(HttpResponse::Created().json(video))
}

/// PUT /videos/{id} - update only the supplied fields.
pub async fn update_video(
    id: web::Path<String>,
    payload: web::Json<VideoUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let changes = payload.into_inner().into_changes()?;

    let video = state
        .db
        .update_video(&id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    info!("Updated video {}", id);
    Ok(HttpResponse::Ok().json(video))
}

/// DELETE /videos/{id} - remove a record permanently.
pub async fn delete_video(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    if !state.db.delete_video(&id).await? {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    info!("Deleted video {}", id);
    Ok(HttpResponse::NoContent().finish())
}
