//! # Car Repository
//!
//! Cars keyed by their registration plate (`car_no`).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use driveshare_core::Car;

#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    car_no: String,
    owner_email: String,
    car_type_id: String,
    daily_price_cents: i64,
    avatar: String,
    from_where: String,
    to_where: String,
    created_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Car {
            car_no: row.car_no,
            owner_email: row.owner_email,
            car_type_id: row.car_type_id,
            daily_price_cents: row.daily_price_cents,
            avatar: row.avatar,
            from_where: row.from_where,
            to_where: row.to_where,
            created_at: row.created_at,
        }
    }
}

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Inserts a car.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the car_no is already registered
    /// - `ForeignKeyViolation` when the car type doesn't exist
    pub async fn insert(&self, car: &Car) -> DbResult<()> {
        debug!(car_no = %car.car_no, owner = %car.owner_email, "Inserting car");

        sqlx::query(
            r#"
            INSERT INTO cars (
                car_no, owner_email, car_type_id, daily_price_cents,
                avatar, from_where, to_where, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&car.car_no)
        .bind(&car.owner_email)
        .bind(&car.car_type_id)
        .bind(car.daily_price_cents)
        .bind(&car.avatar)
        .bind(&car.from_where)
        .bind(&car.to_where)
        .bind(car.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&car.car_no))?;

        Ok(())
    }

    /// Gets a car by its registration plate.
    pub async fn get_by_car_no(&self, car_no: &str) -> DbResult<Option<Car>> {
        let row: Option<CarRow> = sqlx::query_as(
            r#"
            SELECT car_no, owner_email, car_type_id, daily_price_cents,
                   avatar, from_where, to_where, created_at
            FROM cars
            WHERE car_no = ?
            "#,
        )
        .bind(car_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Car::from))
    }

    /// Lists an owner's cars in registration order.
    pub async fn list_by_owner(&self, owner_email: &str) -> DbResult<Vec<Car>> {
        debug!(owner = %owner_email, "Listing cars by owner");

        let rows: Vec<CarRow> = sqlx::query_as(
            r#"
            SELECT car_no, owner_email, car_type_id, daily_price_cents,
                   avatar, from_where, to_where, created_at
            FROM cars
            WHERE owner_email = ?
            ORDER BY rowid
            "#,
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Car::from).collect())
    }

    /// Number of registered cars.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_get_by_car_no() {
        let db = fixtures::seeded_db().await;

        let car = db.cars().get_by_car_no("C1").await.unwrap().unwrap();
        assert_eq!(car, fixtures::car("C1", "owner@example.com"));
        assert!(db.cars().get_by_car_no("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_in_registration_order() {
        let db = fixtures::seeded_db().await;
        db.cars()
            .insert(&fixtures::car("A0", "owner@example.com"))
            .await
            .unwrap();
        db.cars()
            .insert(&fixtures::car("Z9", "someone@example.com"))
            .await
            .unwrap();

        let cars = db.cars().list_by_owner("owner@example.com").await.unwrap();
        let plates: Vec<_> = cars.iter().map(|c| c.car_no.as_str()).collect();
        assert_eq!(plates, vec!["C1", "C2", "A0"]);

        assert!(db.cars().list_by_owner("nobody@example.com").await.unwrap().is_empty());
        assert_eq!(db.cars().count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_car_no() {
        let db = fixtures::seeded_db().await;
        let err = db
            .cars()
            .insert(&fixtures::car("C1", "other@example.com"))
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "cars.car_no");
                assert_eq!(value, "C1");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_car_type_is_rejected() {
        let db = fixtures::seeded_db().await;
        let mut car = fixtures::car("C3", "owner@example.com");
        car.car_type_id = "ghost".to_string();

        let err = db.cars().insert(&car).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
