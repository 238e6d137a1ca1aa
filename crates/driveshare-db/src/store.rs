//! # ReservationStore for Database
//!
//! Adapts the SQLite repositories to the store interface the service
//! layer is generic over. Every call maps [`DbError`](crate::DbError) into
//! [`StoreError`], so unique violations surface as `Duplicate`.

use driveshare_core::{
    Car, CarType, CarTypeSpec, Order, ReservationStore, Review, StoreError, StoreResult, User,
};

use crate::pool::Database;

impl ReservationStore for Database {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users().insert(user).await.map_err(StoreError::from)
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        self.users().get_by_email(email).await.map_err(StoreError::from)
    }

    async fn find_car_type_by_spec(&self, spec: &CarTypeSpec) -> StoreResult<Option<CarType>> {
        self.car_types()
            .find_by_spec(spec)
            .await
            .map_err(StoreError::from)
    }

    async fn find_car_type(&self, id: &str) -> StoreResult<Option<CarType>> {
        self.car_types().get_by_id(id).await.map_err(StoreError::from)
    }

    async fn insert_car_type(&self, car_type: &CarType) -> StoreResult<()> {
        self.car_types()
            .insert(car_type)
            .await
            .map_err(StoreError::from)
    }

    async fn insert_car(&self, car: &Car) -> StoreResult<()> {
        self.cars().insert(car).await.map_err(StoreError::from)
    }

    async fn find_car(&self, car_no: &str) -> StoreResult<Option<Car>> {
        self.cars().get_by_car_no(car_no).await.map_err(StoreError::from)
    }

    async fn cars_by_owner(&self, owner_email: &str) -> StoreResult<Vec<Car>> {
        self.cars()
            .list_by_owner(owner_email)
            .await
            .map_err(StoreError::from)
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.orders().insert(order).await.map_err(StoreError::from)
    }

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        self.orders().get_by_id(id).await.map_err(StoreError::from)
    }

    async fn orders_by_car(&self, car_no: &str) -> StoreResult<Vec<Order>> {
        self.orders().list_by_car(car_no).await.map_err(StoreError::from)
    }

    async fn orders_by_renter(&self, renter_email: &str) -> StoreResult<Vec<Order>> {
        self.orders()
            .list_by_renter(renter_email)
            .await
            .map_err(StoreError::from)
    }

    async fn replace_order(&self, order: &Order) -> StoreResult<bool> {
        self.orders().replace(order).await.map_err(StoreError::from)
    }

    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        self.reviews().insert(review).await.map_err(StoreError::from)
    }

    async fn find_review_by_order(&self, order_id: &str) -> StoreResult<Option<Review>> {
        self.reviews()
            .get_by_order_id(order_id)
            .await
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_duplicate_surfaces_as_store_duplicate() {
        let db = fixtures::seeded_db().await;
        let user = fixtures::user("renter@example.com", "rita");

        db.insert_user(&user).await.unwrap();
        let err = db.insert_user(&user).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { ref value, .. } if value == "renter@example.com"));
    }

    #[tokio::test]
    async fn test_closed_pool_is_backend_error() {
        let db = fixtures::seeded_db().await;
        db.close().await;

        let err = db.find_car("C1").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_order_round_trip_through_trait() {
        let db = fixtures::seeded_db().await;
        let order = fixtures::order("o1", "renter@example.com", "C1", 0, 24);

        db.insert_order(&order).await.unwrap();
        assert_eq!(db.orders_by_car("C1").await.unwrap(), vec![order.clone()]);
        assert_eq!(db.orders_by_renter("renter@example.com").await.unwrap().len(), 1);
        assert!(db.replace_order(&order).await.unwrap());
    }
}
