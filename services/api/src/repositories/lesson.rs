//! Lesson repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{CreateLessonRequest, Lesson, UpdateLessonRequest};
use crate::pagination::Page;

fn lesson_from_row(row: &PgRow) -> Lesson {
    Lesson {
        id: row.get("id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
        description: row.get("description"),
        preview_url: row.get("preview_url"),
        video_url: row.get("video_url"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Lesson repository
#[derive(Clone)]
pub struct LessonRepository {
    pool: PgPool,
}

impl LessonRepository {
    /// Create a new lesson repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List lessons visible to the caller
    pub async fn list(&self, owner_filter: Option<Uuid>, page: Page) -> Result<(Vec<Lesson>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, title, description, preview_url, video_url,
                   owner_id, created_at, updated_at
            FROM lessons
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_filter)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE ($1::uuid IS NULL OR owner_id = $1)")
                .bind(owner_filter)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows.iter().map(lesson_from_row).collect(), total))
    }

    /// Find a lesson by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lesson>> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, title, description, preview_url, video_url,
                   owner_id, created_at, updated_at
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(lesson_from_row))
    }

    /// Create a lesson owned by the given user
    pub async fn create(&self, owner_id: Uuid, request: &CreateLessonRequest) -> Result<Lesson> {
        let row = sqlx::query(
            r#"
            INSERT INTO lessons (course_id, title, description, preview_url, video_url, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, title, description, preview_url, video_url,
                      owner_id, created_at, updated_at
            "#,
        )
        .bind(request.course_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.preview_url)
        .bind(&request.video_url)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson_from_row(&row))
    }

    /// Apply a partial update; course and owner are never changed
    pub async fn update(&self, id: Uuid, request: &UpdateLessonRequest) -> Result<Option<Lesson>> {
        let row = sqlx::query(
            r#"
            UPDATE lessons
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                preview_url = COALESCE($4, preview_url),
                video_url = COALESCE($5, video_url),
                updated_at = now()
            WHERE id = $1
            RETURNING id, course_id, title, description, preview_url, video_url,
                      owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.preview_url)
        .bind(&request.video_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(lesson_from_row))
    }

    /// Delete a lesson
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
