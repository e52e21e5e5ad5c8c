//! Course repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Course, CourseDetail, CreateCourseRequest, UpdateCourseRequest};
use crate::pagination::Page;

fn course_from_row(row: &PgRow) -> Course {
    Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        preview_url: row.get("preview_url"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Course repository
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List courses visible to the caller. `owner_filter` restricts the
    /// listing to a single owner; `None` lists everything.
    pub async fn list(&self, owner_filter: Option<Uuid>, page: Page) -> Result<(Vec<Course>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, preview_url, owner_id, created_at, updated_at
            FROM courses
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
            sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE ($1::uuid IS NULL OR owner_id = $1)")
                .bind(owner_filter)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows.iter().map(course_from_row).collect(), total))
    }

    /// Find a course by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, preview_url, owner_id, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    /// Detail view of a course: the course plus its lesson count and
    /// whether the viewer is subscribed (false when there is no viewer)
    pub async fn detail(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Option<CourseDetail>> {
        let Some(course) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let lessons_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        let is_subscribed = match viewer {
            Some(user_id) => sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM subscriptions WHERE user_id = $1 AND course_id = $2)",
            )
            .bind(user_id)
            .bind(id)
            .fetch_one(&self.pool)
            .await?,
            None => false,
        };

        Ok(Some(CourseDetail {
            course,
            lessons_count,
            is_subscribed,
        }))
    }

    /// Create a course owned by the given user
    pub async fn create(&self, owner_id: Uuid, request: &CreateCourseRequest) -> Result<Course> {
        let row = sqlx::query(
            r#"
            INSERT INTO courses (title, description, preview_url, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, preview_url, owner_id, created_at, updated_at
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.preview_url)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(course_from_row(&row))
    }

    /// Apply a partial update; the owner is never changed
    pub async fn update(&self, id: Uuid, request: &UpdateCourseRequest) -> Result<Option<Course>> {
        let row = sqlx::query(
            r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                preview_url = COALESCE($4, preview_url),
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, description, preview_url, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.preview_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    /// Delete a course; lessons and subscriptions go with it via the
    /// foreign-key cascade
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
