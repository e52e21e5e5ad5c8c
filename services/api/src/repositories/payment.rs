//! Payment repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{CreatePaymentRequest, Payment, PaymentListQuery, PaymentMethod};
use crate::pagination::Page;

fn payment_from_row(row: &PgRow) -> Result<Payment> {
    let method: String = row.get("payment_method");
    let payment_method = PaymentMethod::from_str(&method).map_err(|e| anyhow::anyhow!(e))?;

    Ok(Payment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        payment_date: row.get("payment_date"),
        paid_course_id: row.get("paid_course_id"),
        paid_lesson_id: row.get("paid_lesson_id"),
        amount: row.get("amount"),
        payment_method,
        checkout_session_url: row.get("checkout_session_url"),
        created_at: row.get("created_at"),
    })
}

/// Payment repository
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List payments ordered by payment date, honoring the optional filters
    /// and an optional owner restriction
    pub async fn list(
        &self,
        query: &PaymentListQuery,
        owner_filter: Option<Uuid>,
        page: Page,
    ) -> Result<(Vec<Payment>, i64)> {
        let method = query.payment_method.map(|m| m.as_str());

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, payment_date, paid_course_id, paid_lesson_id,
                   amount, payment_method, checkout_session_url, created_at
            FROM payments
            WHERE ($1::date IS NULL OR payment_date >= $1)
              AND ($2::date IS NULL OR payment_date <= $2)
              AND ($3::text IS NULL OR payment_method = $3)
              AND ($4::uuid IS NULL OR paid_course_id = $4)
              AND ($5::uuid IS NULL OR paid_lesson_id = $5)
              AND ($6::uuid IS NULL OR user_id = $6)
            ORDER BY payment_date
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(query.min_date)
        .bind(query.max_date)
        .bind(method)
        .bind(query.course)
        .bind(query.lesson)
        .bind(owner_filter)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payments
            WHERE ($1::date IS NULL OR payment_date >= $1)
              AND ($2::date IS NULL OR payment_date <= $2)
              AND ($3::text IS NULL OR payment_method = $3)
              AND ($4::uuid IS NULL OR paid_course_id = $4)
              AND ($5::uuid IS NULL OR paid_lesson_id = $5)
              AND ($6::uuid IS NULL OR user_id = $6)
            "#,
        )
        .bind(query.min_date)
        .bind(query.max_date)
        .bind(method)
        .bind(query.course)
        .bind(query.lesson)
        .bind(owner_filter)
        .fetch_one(&self.pool)
        .await?;

        let payments = rows
            .iter()
            .map(payment_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok((payments, total))
    }

    /// Persist a payment record as submitted, without a session URL
    pub async fn create(&self, user_id: Uuid, request: &CreatePaymentRequest) -> Result<Payment> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (user_id, payment_date, paid_course_id, paid_lesson_id,
                                  amount, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, payment_date, paid_course_id, paid_lesson_id,
                      amount, payment_method, checkout_session_url, created_at
            "#,
        )
        .bind(user_id)
        .bind(request.payment_date)
        .bind(request.paid_course_id)
        .bind(request.paid_lesson_id)
        .bind(request.amount)
        .bind(request.payment_method.as_str())
        .fetch_one(&self.pool)
        .await?;

        payment_from_row(&row)
    }

    /// Attach the gateway checkout-session URL after a successful gateway
    /// round trip
    pub async fn attach_session_url(&self, id: Uuid, url: &str) -> Result<()> {
        sqlx::query("UPDATE payments SET checkout_session_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
