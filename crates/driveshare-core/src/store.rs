//! # Store Capability
//!
//! The narrow persistence interface the service layer is written against.
//!
//! ```text
//! ┌──────────────────────────┐        ┌───────────────────────────────┐
//! │  ReservationService<S>   │──uses──►  S: ReservationStore          │
//! └──────────────────────────┘        │  ├── driveshare_db::Database  │
//!                                     │  └── InMemoryStore (tests)    │
//!                                     └───────────────────────────────┘
//! ```
//!
//! Per collection: insert, find-one, find-many, and replace for orders.
//! Inserts report unique-key violations as [`StoreError::Duplicate`].
//! Calls are independent; there are no transactions across them.

use std::future::Future;

use crate::error::StoreError;
use crate::types::{Car, CarType, CarTypeSpec, Order, Review, User};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, cars, car types, orders and reviews.
///
/// Implementations must enforce uniqueness on `User.email`, `Car.car_no`
/// and `Review.order_id`.
pub trait ReservationStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    fn insert_user(&self, user: &User) -> impl Future<Output = StoreResult<()>> + Send;

    fn find_user(&self, email: &str) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    // -------------------------------------------------------------------------
    // Car types
    // -------------------------------------------------------------------------

    /// Looks a car type up by its full attribute tuple.
    fn find_car_type_by_spec(
        &self,
        spec: &CarTypeSpec,
    ) -> impl Future<Output = StoreResult<Option<CarType>>> + Send;

    fn find_car_type(&self, id: &str) -> impl Future<Output = StoreResult<Option<CarType>>> + Send;

    fn insert_car_type(&self, car_type: &CarType) -> impl Future<Output = StoreResult<()>> + Send;

    // -------------------------------------------------------------------------
    // Cars
    // -------------------------------------------------------------------------

    fn insert_car(&self, car: &Car) -> impl Future<Output = StoreResult<()>> + Send;

    fn find_car(&self, car_no: &str) -> impl Future<Output = StoreResult<Option<Car>>> + Send;

    /// Owner's cars in registration order.
    fn cars_by_owner(&self, owner_email: &str)
        -> impl Future<Output = StoreResult<Vec<Car>>> + Send;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    fn insert_order(&self, order: &Order) -> impl Future<Output = StoreResult<()>> + Send;

    fn find_order(&self, id: &str) -> impl Future<Output = StoreResult<Option<Order>>> + Send;

    /// Every order on a car, in creation order.
    fn orders_by_car(&self, car_no: &str) -> impl Future<Output = StoreResult<Vec<Order>>> + Send;

    /// Every order by a renter, in creation order.
    fn orders_by_renter(
        &self,
        renter_email: &str,
    ) -> impl Future<Output = StoreResult<Vec<Order>>> + Send;

    /// Overwrites the stored order with the same id.
    ///
    /// Returns `false` when no row matched.
    fn replace_order(&self, order: &Order) -> impl Future<Output = StoreResult<bool>> + Send;

    // -------------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------------

    fn insert_review(&self, review: &Review) -> impl Future<Output = StoreResult<()>> + Send;

    fn find_review_by_order(
        &self,
        order_id: &str,
    ) -> impl Future<Output = StoreResult<Option<Review>>> + Send;
}
