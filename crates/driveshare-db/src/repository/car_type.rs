//! # Car Type Repository
//!
//! Car types are shared between cars with the same
//! (brand, model, seats, gearbox, fuel) tuple. The tuple carries a UNIQUE
//! constraint, so the lookup-then-insert done at registration can't leave
//! two rows for one model.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use driveshare_core::{CarType, CarTypeSpec};

#[derive(Debug, sqlx::FromRow)]
struct CarTypeRow {
    id: String,
    brand: String,
    model: String,
    seats: i64,
    gearbox: String,
    fuel: String,
}

impl From<CarTypeRow> for CarType {
    fn from(row: CarTypeRow) -> Self {
        CarType {
            id: row.id,
            brand: row.brand,
            model: row.model,
            seats: row.seats,
            gearbox: row.gearbox,
            fuel: row.fuel,
        }
    }
}

/// Repository for car type database operations.
#[derive(Debug, Clone)]
pub struct CarTypeRepository {
    pool: SqlitePool,
}

impl CarTypeRepository {
    /// Creates a new CarTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarTypeRepository { pool }
    }

    /// Inserts a car type.
    pub async fn insert(&self, car_type: &CarType) -> DbResult<()> {
        debug!(id = %car_type.id, description = %car_type.description(), "Inserting car type");

        sqlx::query(
            r#"
            INSERT INTO car_types (id, brand, model, seats, gearbox, fuel)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&car_type.id)
        .bind(&car_type.brand)
        .bind(&car_type.model)
        .bind(car_type.seats)
        .bind(&car_type.gearbox)
        .bind(&car_type.fuel)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&car_type.description()))?;

        Ok(())
    }

    /// Gets a car type by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CarType>> {
        let row: Option<CarTypeRow> = sqlx::query_as(
            r#"
            SELECT id, brand, model, seats, gearbox, fuel
            FROM car_types
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CarType::from))
    }

    /// Finds the car type matching every attribute of `spec`.
    pub async fn find_by_spec(&self, spec: &CarTypeSpec) -> DbResult<Option<CarType>> {
        debug!(brand = %spec.brand, model = %spec.model, "Looking up car type");

        let row: Option<CarTypeRow> = sqlx::query_as(
            r#"
            SELECT id, brand, model, seats, gearbox, fuel
            FROM car_types
            WHERE brand = ? AND model = ? AND seats = ? AND gearbox = ? AND fuel = ?
            "#,
        )
        .bind(&spec.brand)
        .bind(&spec.model)
        .bind(spec.seats)
        .bind(&spec.gearbox)
        .bind(&spec.fuel)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CarType::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_find_by_spec_matches_full_tuple() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car_type = fixtures::car_type();
        db.car_types().insert(&car_type).await.unwrap();

        let found = db.car_types().find_by_spec(&car_type.spec()).await.unwrap();
        assert_eq!(found, Some(car_type.clone()));

        let mut other = car_type.spec();
        other.seats = 7;
        assert!(db.car_types().find_by_spec(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.car_types().insert(&fixtures::car_type()).await.unwrap();

        let found = db.car_types().get_by_id("type-1").await.unwrap().unwrap();
        assert_eq!(found.description(), "Honda City");
        assert!(db.car_types().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_tuple_twice_is_duplicate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = fixtures::car_type();
        let mut second = fixtures::car_type();
        second.id = "type-2".to_string();

        db.car_types().insert(&first).await.unwrap();
        let err = db.car_types().insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
