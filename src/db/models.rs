use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored video record. Mirrors the `videos` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: String,
    pub url: String,
    pub name: String,
    pub title: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub user: Option<String>,
    pub poster: Option<String>,
    pub script: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Build a fresh record with a generated id and zero views.
    /// Optional columns start empty and are filled in by the caller.
    pub fn new(url: String, name: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            url,
            name,
            title,
            image: None,
            video: None,
            user: None,
            poster: None,
            script: None,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field-level changes for a partial update.
///
/// Required columns carry `Option<String>` (set or leave alone); nullable
/// columns carry `Option<Option<String>>` so a supplied empty value can
/// clear the column while an absent field leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub url: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub image: Option<Option<String>>,
    pub video: Option<Option<String>>,
    pub user: Option<Option<String>>,
    pub poster: Option<Option<String>>,
    pub script: Option<Option<String>>,
}

impl VideoChanges {
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.name.is_none()
            && self.title.is_none()
            && self.image.is_none()
            && self.video.is_none()
            && self.user.is_none()
            && self.poster.is_none()
            && self.script.is_none()
    }
}

/// One record from the upstream quip feed. Every field is optional;
/// rows missing required columns are rejected by the database, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub id: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub user: Option<String>,
    pub poster: Option<String>,
    pub script: Option<String>,
    pub views: Option<i64>,
}
