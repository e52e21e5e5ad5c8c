//! Course model and catalog payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Course entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course creation payload; the caller becomes the owner
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub preview_url: Option<String>,
}

/// Course update payload; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub preview_url: Option<String>,
}

/// Course detail view with derived fields
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    /// Number of lessons in the course
    pub lessons_count: i64,
    /// Whether the current caller is subscribed; false for anonymous callers
    pub is_subscribed: bool,
}

/// Paginated course listing
#[derive(Debug, Clone, Serialize)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}
