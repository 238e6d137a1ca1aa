//! # In-Memory Store
//!
//! A [`ReservationStore`] kept in process memory. Used by the service tests
//! and for running the service without a database file.
//!
//! ```text
//! InMemoryStore (Clone, shares one table set)
//!   └── Arc<Mutex<Tables>>
//!         ├── users      HashMap<email, User>
//!         ├── car_types  Vec<CarType>
//!         ├── cars       Vec<Car>        registration order
//!         ├── orders     Vec<Order>      creation order
//!         └── reviews    HashMap<order_id, Review>
//! ```
//!
//! Uniqueness on email, car_no and review order_id is enforced like the
//! SQLite schema does. Two knobs exist for tests: a per-call latency and a
//! switch that makes `replace_order` report no match.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use driveshare_core::{
    Car, CarType, CarTypeSpec, Order, ReservationStore, Review, StoreError, StoreResult, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    car_types: Vec<CarType>,
    cars: Vec<Car>,
    orders: Vec<Order>,
    reviews: HashMap<String, Review>,
}

#[derive(Debug, Default)]
struct Faults {
    latency: Mutex<Option<Duration>>,
    reject_replace: AtomicBool,
}

/// Process-local store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        let mut guard = self
            .faults
            .latency
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *guard = latency;
    }

    /// Makes `replace_order` report that no row matched.
    pub fn reject_order_replace(&self, reject: bool) {
        self.faults.reject_replace.store(reject, Ordering::SeqCst);
    }

    /// Number of stored reviews.
    pub fn review_count(&self) -> StoreResult<usize> {
        Ok(self.tables()?.reviews.len())
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    async fn delay(&self) {
        let latency = *self
            .faults
            .latency
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ReservationStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.delay().await;
        let mut tables = self.tables()?;
        if tables.users.contains_key(&user.email) {
            return Err(StoreError::duplicate("users.email", &user.email));
        }
        tables.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, email: &str) -> StoreResult<Option<User>> {
        self.delay().await;
        Ok(self.tables()?.users.get(email).cloned())
    }

    async fn find_car_type_by_spec(&self, spec: &CarTypeSpec) -> StoreResult<Option<CarType>> {
        self.delay().await;
        Ok(self
            .tables()?
            .car_types
            .iter()
            .find(|t| t.spec() == *spec)
            .cloned())
    }

    async fn find_car_type(&self, id: &str) -> StoreResult<Option<CarType>> {
        self.delay().await;
        Ok(self
            .tables()?
            .car_types
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn insert_car_type(&self, car_type: &CarType) -> StoreResult<()> {
        self.delay().await;
        let mut tables = self.tables()?;
        let spec = car_type.spec();
        if tables.car_types.iter().any(|t| t.spec() == spec) {
            return Err(StoreError::duplicate("car_types", car_type.description()));
        }
        tables.car_types.push(car_type.clone());
        Ok(())
    }

    async fn insert_car(&self, car: &Car) -> StoreResult<()> {
        self.delay().await;
        let mut tables = self.tables()?;
        if tables.cars.iter().any(|c| c.car_no == car.car_no) {
            return Err(StoreError::duplicate("cars.car_no", &car.car_no));
        }
        tables.cars.push(car.clone());
        Ok(())
    }

    async fn find_car(&self, car_no: &str) -> StoreResult<Option<Car>> {
        self.delay().await;
        Ok(self
            .tables()?
            .cars
            .iter()
            .find(|c| c.car_no == car_no)
            .cloned())
    }

    async fn cars_by_owner(&self, owner_email: &str) -> StoreResult<Vec<Car>> {
        self.delay().await;
        Ok(self
            .tables()?
            .cars
            .iter()
            .filter(|c| c.owner_email == owner_email)
            .cloned()
            .collect())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.delay().await;
        let mut tables = self.tables()?;
        if tables.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::duplicate("orders.id", &order.id));
        }
        tables.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        self.delay().await;
        Ok(self
            .tables()?
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn orders_by_car(&self, car_no: &str) -> StoreResult<Vec<Order>> {
        self.delay().await;
        Ok(self
            .tables()?
            .orders
            .iter()
            .filter(|o| o.car_no == car_no)
            .cloned()
            .collect())
    }

    async fn orders_by_renter(&self, renter_email: &str) -> StoreResult<Vec<Order>> {
        self.delay().await;
        Ok(self
            .tables()?
            .orders
            .iter()
            .filter(|o| o.renter_email == renter_email)
            .cloned()
            .collect())
    }

    async fn replace_order(&self, order: &Order) -> StoreResult<bool> {
        self.delay().await;
        if self.faults.reject_replace.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut tables = self.tables()?;
        match tables.orders.iter_mut().find(|o| o.id == order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        self.delay().await;
        let mut tables = self.tables()?;
        if tables.reviews.contains_key(&review.order_id) {
            return Err(StoreError::duplicate("reviews.order_id", &review.order_id));
        }
        tables
            .reviews
            .insert(review.order_id.clone(), review.clone());
        Ok(())
    }

    async fn find_review_by_order(&self, order_id: &str) -> StoreResult<Option<Review>> {
        self.delay().await;
        Ok(self.tables()?.reviews.get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use driveshare_core::{LoginMethod, OrderStatus, PayMethod};

    fn user(email: &str) -> User {
        User {
            id: format!("u-{email}"),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: "test".to_string(),
            avatar: String::new(),
            login_method: LoginMethod::Google,
            credentials: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn order(id: &str) -> Order {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Order {
            id: id.to_string(),
            renter_email: "r@example.com".to_string(),
            car_no: "C1".to_string(),
            from_time: at,
            to_time: at + chrono::Duration::days(1),
            status: OrderStatus::Pending,
            pay_method: PayMethod::CreditCard,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = InMemoryStore::new();
        store.insert_user(&user("a@example.com")).await.unwrap();

        let err = store.insert_user(&user("a@example.com")).await.unwrap_err();
        assert_eq!(err, StoreError::duplicate("users.email", "a@example.com"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.insert_order(&order("o1")).await.unwrap();

        assert!(other.find_order("o1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_order() {
        let store = InMemoryStore::new();
        let stored = order("o1");
        store.insert_order(&stored).await.unwrap();

        let cancelled = stored.with_status(OrderStatus::Cancelled);
        assert!(store.replace_order(&cancelled).await.unwrap());
        assert_eq!(
            store.find_order("o1").await.unwrap().unwrap().status,
            OrderStatus::Cancelled
        );

        assert!(!store.replace_order(&order("missing")).await.unwrap());

        store.reject_order_replace(true);
        assert!(!store.replace_order(&stored).await.unwrap());
    }
}
