//! # Order Repository
//!
//! Reservation rows. Orders are never deleted; cancelling or completing
//! one is a [`replace`](OrderRepository::replace) of the whole row.
//!
//! ## Status in the database
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────┐
//! │ status       │ meaning                                      │
//! ├──────────────┼──────────────────────────────────────────────┤
//! │ 'pending'    │ booked, blocks the car and the renter        │
//! │ 'completed'  │ reviewed; still blocks its window            │
//! │ 'cancelled'  │ released, ignored by conflict checks         │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use driveshare_core::{Order, OrderStatus, PayMethod};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    renter_email: String,
    car_no: String,
    from_time: DateTime<Utc>,
    to_time: DateTime<Utc>,
    status: OrderStatus,
    pay_method: PayMethod,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            renter_email: row.renter_email,
            car_no: row.car_no,
            from_time: row.from_time,
            to_time: row.to_time,
            status: row.status,
            pay_method: row.pay_method,
            created_at: row.created_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(
            id = %order.id,
            car_no = %order.car_no,
            renter = %order.renter_email,
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, renter_email, car_no, from_time, to_time,
                status, pay_method, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.renter_email)
        .bind(&order.car_no)
        .bind(order.from_time)
        .bind(order.to_time)
        .bind(order.status)
        .bind(order.pay_method)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&order.id))?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, renter_email, car_no, from_time, to_time,
                   status, pay_method, created_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Lists every order on a car, including cancelled ones, in creation order.
    pub async fn list_by_car(&self, car_no: &str) -> DbResult<Vec<Order>> {
        debug!(car_no = %car_no, "Listing orders by car");

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, renter_email, car_no, from_time, to_time,
                   status, pay_method, created_at
            FROM orders
            WHERE car_no = ?
            ORDER BY rowid
            "#,
        )
        .bind(car_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Lists every order placed by a renter, in creation order.
    pub async fn list_by_renter(&self, renter_email: &str) -> DbResult<Vec<Order>> {
        debug!(renter = %renter_email, "Listing orders by renter");

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, renter_email, car_no, from_time, to_time,
                   status, pay_method, created_at
            FROM orders
            WHERE renter_email = ?
            ORDER BY rowid
            "#,
        )
        .bind(renter_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Overwrites the row with `order.id`.
    ///
    /// Returns `false` when no row has that id.
    pub async fn replace(&self, order: &Order) -> DbResult<bool> {
        debug!(id = %order.id, status = %order.status, "Replacing order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                renter_email = ?,
                car_no = ?,
                from_time = ?,
                to_time = ?,
                status = ?,
                pay_method = ?,
                created_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&order.renter_email)
        .bind(&order.car_no)
        .bind(order.from_time)
        .bind(order.to_time)
        .bind(order.status)
        .bind(order.pay_method)
        .bind(order.created_at)
        .bind(&order.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = fixtures::seeded_db().await;
        let order = fixtures::order("o1", "renter@example.com", "C1", 0, 48);

        db.orders().insert(&order).await.unwrap();

        let found = db.orders().get_by_id("o1").await.unwrap();
        assert_eq!(found, Some(order));
        assert!(db.orders().get_by_id("o2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lists_by_car_and_renter() {
        let db = fixtures::seeded_db().await;
        let orders = [
            fixtures::order("o1", "a@example.com", "C1", 0, 24),
            fixtures::order("o2", "b@example.com", "C1", 48, 72),
            fixtures::order("o3", "a@example.com", "C2", 100, 124),
        ];
        for order in &orders {
            db.orders().insert(order).await.unwrap();
        }

        let by_car: Vec<_> = db
            .orders()
            .list_by_car("C1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(by_car, vec!["o1", "o2"]);

        let by_renter: Vec<_> = db
            .orders()
            .list_by_renter("a@example.com")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(by_renter, vec!["o1", "o3"]);
    }

    #[tokio::test]
    async fn test_replace_updates_status() {
        let db = fixtures::seeded_db().await;
        let order = fixtures::order("o1", "renter@example.com", "C1", 0, 48);
        db.orders().insert(&order).await.unwrap();

        let cancelled = order.with_status(OrderStatus::Cancelled);
        assert!(db.orders().replace(&cancelled).await.unwrap());

        let stored = db.orders().get_by_id("o1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(stored.from_time, order.from_time);
    }

    #[tokio::test]
    async fn test_replace_missing_order_returns_false() {
        let db = fixtures::seeded_db().await;
        let ghost = fixtures::order("ghost", "renter@example.com", "C1", 0, 48);
        assert!(!db.orders().replace(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn test_order_on_unknown_car_is_rejected() {
        let db = fixtures::seeded_db().await;
        let order = fixtures::order("o1", "renter@example.com", "NOPE", 0, 48);

        let err = db.orders().insert(&order).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
