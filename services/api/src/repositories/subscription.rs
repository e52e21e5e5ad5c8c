//! Subscription repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Subscription repository
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get-or-create the (user, course) subscription. Returns `true` when a
    /// new row was created and `false` when the pair was already subscribed.
    ///
    /// The unique constraint on (user_id, course_id) makes this safe under
    /// concurrent duplicate calls.
    pub async fn subscribe(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove the (user, course) subscription. Returns `false` when no such
    /// subscription existed.
    pub async fn unsubscribe(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Email addresses of every subscriber of a course
    pub async fn subscriber_emails(&self, course_id: Uuid) -> Result<Vec<String>> {
        let emails = sqlx::query_scalar(
            r#"
            SELECT u.email
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.course_id = $1
            ORDER BY s.created_at
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}
