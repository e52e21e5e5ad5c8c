//! Lesson model and catalog payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lesson entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub video_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lesson creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub video_url: Option<String>,
}

/// Lesson update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub preview_url: Option<String>,
    pub video_url: Option<String>,
}

/// Paginated lesson listing
#[derive(Debug, Clone, Serialize)]
pub struct LessonListResponse {
    pub items: Vec<Lesson>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}
