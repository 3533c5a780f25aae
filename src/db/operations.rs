use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::db::models::{SourceRecord, Video, VideoChanges};
use crate::error::{AppError, DatabaseError};

const SELECT_COLUMNS: &str =
    "id, url, name, title, image, video, `user`, poster, script, views, created_at, updated_at";

// `user` needs quoting; the rest of the schema follows the upstream feed shape.
const CREATE_VIDEOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id VARCHAR(50) NOT NULL PRIMARY KEY,
    url VARCHAR(500) NOT NULL,
    name VARCHAR(255) NOT NULL,
    title VARCHAR(255) NOT NULL,
    image VARCHAR(500) NULL,
    video VARCHAR(500) NULL,
    `user` VARCHAR(255) NULL,
    poster VARCHAR(500) NULL,
    script VARCHAR(2000) NULL,
    views BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
)
"#;

/// Sort orders accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSort {
    Views,
    Title,
    CreatedAt,
}

impl VideoSort {
    fn order_clause(self) -> &'static str {
        match self {
            VideoSort::Views => "views DESC",
            VideoSort::Title => "title ASC",
            VideoSort::CreatedAt => "created_at DESC",
        }
    }
}

pub struct DbOperations {
    pool: Arc<MySqlPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<MySqlPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string()))
            })?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &MySqlPool {
        self.pool.as_ref()
    }

    /// Create the `videos` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_VIDEOS_TABLE)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    pub async fn get_pool_status(&self) -> DbPoolStatus {
        let size = self.pool.size();
        let idle = self.pool.num_idle() as u32;
        let active = size - idle;

        DbPoolStatus {
            total_connections: size,
            active_connections: active,
            idle_connections: idle,
        }
    }

    pub async fn count_videos(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(total)
    }

    pub async fn list_videos(
        &self,
        page: u64,
        page_size: u64,
        sort: VideoSort,
    ) -> Result<Vec<Video>, AppError> {
        let offset = (page - 1) * page_size;
        let sql = format!(
            "SELECT {} FROM videos ORDER BY {} LIMIT ? OFFSET ?",
            SELECT_COLUMNS,
            sort.order_clause()
        );

        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(page_size)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(videos)
    }

    pub async fn count_search(&self, query: &str) -> Result<i64, AppError> {
        let pattern = format!("%{}%", query);
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM videos WHERE title LIKE ? OR name LIKE ? OR script LIKE ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(total)
    }

    /// Case-insensitive match on title, name, or script; most viewed first.
    pub async fn search_videos(
        &self,
        query: &str,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Video>, AppError> {
        let pattern = format!("%{}%", query);
        let offset = (page - 1) * page_size;
        let sql = format!(
            "SELECT {} FROM videos \
             WHERE title LIKE ? OR name LIKE ? OR script LIKE ? \
             ORDER BY views DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        );

        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(videos)
    }

    pub async fn featured_videos(&self, count: u64) -> Result<Vec<Video>, AppError> {
        let sql = format!(
            "SELECT {} FROM videos ORDER BY RAND() LIMIT ?",
            SELECT_COLUMNS
        );

        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(count)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(videos)
    }

    pub async fn get_video(&self, id: &str) -> Result<Option<Video>, AppError> {
        let sql = format!("SELECT {} FROM videos WHERE id = ?", SELECT_COLUMNS);

        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(video)
    }

    /// Bump the view counter. Returns false when no such row exists.
    pub async fn increment_views(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE videos SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_video(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO videos \
             (id, url, name, title, image, video, `user`, poster, script, views, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&video.id)
        .bind(&video.url)
        .bind(&video.name)
        .bind(&video.title)
        .bind(&video.image)
        .bind(&video.video)
        .bind(&video.user)
        .bind(&video.poster)
        .bind(&video.script)
        .bind(video.views)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    /// Apply a partial update, bumping `updated_at`. Returns the refreshed
    /// row, or None when the id is unknown.
    pub async fn update_video(
        &self,
        id: &str,
        changes: &VideoChanges,
    ) -> Result<Option<Video>, AppError> {
        if self.get_video(id).await?.is_none() {
            return Ok(None);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE videos SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(url) = &changes.url {
                fields.push("url = ").push_bind_unseparated(url);
            }
            if let Some(name) = &changes.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(title) = &changes.title {
                fields.push("title = ").push_bind_unseparated(title);
            }
            if let Some(image) = &changes.image {
                fields.push("image = ").push_bind_unseparated(image.clone());
            }
            if let Some(video) = &changes.video {
                fields.push("video = ").push_bind_unseparated(video.clone());
            }
            if let Some(user) = &changes.user {
                fields.push("`user` = ").push_bind_unseparated(user.clone());
            }
            if let Some(poster) = &changes.poster {
                fields.push("poster = ").push_bind_unseparated(poster.clone());
            }
            if let Some(script) = &changes.script {
                fields.push("script = ").push_bind_unseparated(script.clone());
            }
            fields
                .push("updated_at = ")
                .push_bind_unseparated(Utc::now());
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder.build().execute(self.pool.as_ref()).await?;

        self.get_video(id).await
    }

    /// Remove a record permanently. Returns false when no such row exists.
    pub async fn delete_video(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert or refresh one feed record. The upstream view count wins over
    /// the local one, mirroring the source feed.
    pub async fn upsert_video(&self, record: &SourceRecord) -> Result<u64, AppError> {
        let result = sqlx::query(
            "INSERT INTO videos \
             (id, url, name, title, image, video, `user`, views, poster, script) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE \
             url = VALUES(url), \
             name = VALUES(name), \
             title = VALUES(title), \
             image = VALUES(image), \
             video = VALUES(video), \
             `user` = VALUES(`user`), \
             views = VALUES(views), \
             poster = VALUES(poster), \
             script = VALUES(script)",
        )
        .bind(&record.id)
        .bind(&record.url)
        .bind(&record.name)
        .bind(&record.title)
        .bind(&record.image)
        .bind(&record.video)
        .bind(&record.user)
        .bind(record.views.unwrap_or(0))
        .bind(&record.poster)
        .bind(&record.script)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct DbPoolStatus {
    pub total_connections: u32,
    pub active_connections: u32,
    pub idle_connections: u32,
}
