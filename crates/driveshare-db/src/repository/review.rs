//! # Review Repository
//!
//! At most one review per order (`reviews.order_id` is UNIQUE). The photo
//! list is stored as a JSON array in the `avatars` column.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use driveshare_core::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: String,
    order_id: String,
    rating: f64,
    bonus_cents: i64,
    content: String,
    avatars: String,
    reviewed_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DbError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let avatars: Vec<String> =
            serde_json::from_str(&row.avatars).map_err(|e| DbError::InvalidData {
                column: "reviews.avatars".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Review {
            id: row.id,
            order_id: row.order_id,
            rating: row.rating,
            bonus_cents: row.bonus_cents,
            content: row.content,
            avatars,
            reviewed_at: row.reviewed_at,
        })
    }
}

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReviewRepository { pool }
    }

    /// Inserts a review.
    ///
    /// ## Errors
    /// - `UniqueViolation` on `reviews.order_id` if the order was already reviewed
    pub async fn insert(&self, review: &Review) -> DbResult<()> {
        debug!(order_id = %review.order_id, rating = review.rating, "Inserting review");

        let avatars = serde_json::to_string(&review.avatars)
            .map_err(|e| DbError::Internal(format!("Failed to encode avatars: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, order_id, rating, bonus_cents, content, avatars, reviewed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.order_id)
        .bind(review.rating)
        .bind(review.bonus_cents)
        .bind(&review.content)
        .bind(avatars)
        .bind(review.reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&review.order_id))?;

        Ok(())
    }

    /// Gets the review attached to an order, if any.
    pub async fn get_by_order_id(&self, order_id: &str) -> DbResult<Option<Review>> {
        let row: Option<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, rating, bonus_cents, content, avatars, reviewed_at
            FROM reviews
            WHERE order_id = ?
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }
}
