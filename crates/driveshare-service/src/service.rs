//! # Reservation Service
//!
//! The caller-facing operations. Each one loads what it needs from the
//! store, hands the decision to `driveshare-core`, and writes the result
//! back.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Operation = One Deadline                        │
//! │                                                                         │
//! │  create_order(request)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tokio::time::timeout(request_timeout, ...)                            │
//! │       │                                                                 │
//! │       ├── request.validate()            ValidationError                │
//! │       ├── store.find_car                                               │
//! │       ├── store.orders_by_car     ┐                                    │
//! │       ├── store.orders_by_renter  ┘ read                               │
//! │       ├── lifecycle::admit_order        Conflict / NotFound            │
//! │       └── store.insert_order            write (no lock, no txn)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Elapsed? → DeadlineExceeded, outstanding store future dropped         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Windows
//! - `create_order` reads then writes without a lock; two concurrent
//!   bookings for the same window can both pass the conflict check.
//! - `submit_review` inserts the review, then replaces the order. If the
//!   second write fails the review stays and the order remains Pending.
//!   Readers use the review for bonus and rating regardless of status.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use driveshare_core::lifecycle::{
    admit_order, authorize_cancel, authorize_review, open_order, CompletionStep,
};
use driveshare_core::validation::{validate_email, validate_new_car, validate_new_user};
use driveshare_core::views::{
    booking_rows, car_listings, order_detail, review_rows, revenue_report, user_order_rows,
    BookingRow, CarListing, FleetEntry, OrderDetail, RevenueReport, ReviewRow, UserDirectory,
    UserOrderRow,
};
use driveshare_core::{
    Car, CarType, CarTypeSpec, CoreError, CoreResult, ErrorKind, NewCar, NewUser, Order,
    OrderRequest, RatingTally, ReservationStore, Review, ReviewIndex, ReviewRequest, StoreError,
    User,
};

use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;

/// Log target for suspicious-access events.
pub const SECURITY_TARGET: &str = "driveshare::security";

/// Result of a successful review submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedReview {
    pub review: Review,
    /// The order as stored after the submission (Completed).
    pub order: Order,
}

/// An owner's cars with their types and orders, plus every review on them.
struct Fleet {
    entries: Vec<FleetEntry>,
    reviews: ReviewIndex,
}

impl Fleet {
    fn rating(&self) -> RatingTally {
        self.entries.iter().map(|e| e.rating(&self.reviews)).sum()
    }

    fn renter_emails(&self) -> HashSet<String> {
        self.entries
            .iter()
            .flat_map(|e| e.orders.iter())
            .map(|o| o.renter_email.clone())
            .collect()
    }
}

/// Reservation operations over a store `S` and a clock `C`.
///
/// ## Example
/// ```rust,ignore
/// let service = ReservationService::new(db, ServiceConfig::load()?);
/// let order = service.create_order(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReservationService<S, C = SystemClock> {
    store: S,
    clock: C,
    config: ServiceConfig,
}

impl<S: ReservationStore> ReservationService<S, SystemClock> {
    /// Creates a service that reads wall-clock time.
    pub fn new(store: S, config: ServiceConfig) -> Self {
        ReservationService {
            store,
            clock: SystemClock,
            config,
        }
    }
}

impl<S: ReservationStore, C: Clock> ReservationService<S, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(store: S, clock: C, config: ServiceConfig) -> Self {
        ReservationService {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // =========================================================================
    // Deadline
    // =========================================================================

    /// Runs one operation under the request deadline and logs its failure.
    async fn run<T, F>(&self, operation: &'static str, work: F) -> CoreResult<T>
    where
        F: Future<Output = CoreResult<T>>,
    {
        let deadline = self.config.request_timeout;
        let result = match tokio::time::timeout(deadline, work).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::DeadlineExceeded(deadline)),
        };

        if let Err(ref err) = result {
            match err.kind() {
                ErrorKind::SecurityViolation => {
                    warn!(
                        target: SECURITY_TARGET,
                        operation,
                        error = %err,
                        "Suspicious access rejected"
                    );
                }
                ErrorKind::Upstream => {
                    error!(operation, error = %err, "Operation failed upstream");
                }
                _ => {
                    debug!(operation, error = %err, "Operation rejected");
                }
            }
        }

        result
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a user. A taken email is `Duplicate`.
    pub async fn register_user(&self, new_user: NewUser) -> CoreResult<User> {
        self.run("register_user", self.register_user_inner(new_user)).await
    }

    async fn register_user_inner(&self, new_user: NewUser) -> CoreResult<User> {
        validate_new_user(&new_user)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            username: new_user.username,
            avatar: new_user.avatar.unwrap_or_default(),
            login_method: new_user.login_method,
            credentials: new_user.credentials,
            created_at: self.clock.now(),
        };

        self.store.insert_user(&user).await?;
        info!(email = %user.email, login_method = user.login_method.as_str(), "User registered");
        Ok(user)
    }

    /// Registers a car under an existing owner, reusing a matching car type.
    pub async fn register_car(&self, owner_email: &str, new_car: NewCar) -> CoreResult<Car> {
        self.run("register_car", self.register_car_inner(owner_email, new_car)).await
    }

    async fn register_car_inner(&self, owner_email: &str, new_car: NewCar) -> CoreResult<Car> {
        validate_email(owner_email)?;
        validate_new_car(&new_car)?;

        if self.store.find_user(owner_email).await?.is_none() {
            return Err(CoreError::UserNotFound(owner_email.to_string()));
        }

        let car_type = self.resolve_car_type(new_car.spec).await?;

        let car = Car {
            car_no: new_car.car_no,
            owner_email: owner_email.to_string(),
            car_type_id: car_type.id,
            daily_price_cents: new_car.daily_price_cents,
            avatar: new_car.avatar,
            from_where: new_car.from_where,
            to_where: new_car.to_where,
            created_at: self.clock.now(),
        };

        self.store.insert_car(&car).await?;
        info!(car_no = %car.car_no, owner = %car.owner_email, "Car registered");
        Ok(car)
    }

    async fn resolve_car_type(&self, spec: CarTypeSpec) -> CoreResult<CarType> {
        if let Some(existing) = self.store.find_car_type_by_spec(&spec).await? {
            debug!(car_type = %existing.id, "Reusing car type");
            return Ok(existing);
        }

        let car_type = CarType::from_spec(Uuid::new_v4().to_string(), spec);
        match self.store.insert_car_type(&car_type).await {
            Ok(()) => Ok(car_type),
            // Registered concurrently by someone else
            Err(StoreError::Duplicate { .. }) => self
                .store
                .find_car_type_by_spec(&car_type.spec())
                .await?
                .ok_or_else(|| CoreError::Upstream("car type vanished after insert".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    // =========================================================================
    // Order Lifecycle
    // =========================================================================

    /// Books a car for `[from, to)`.
    pub async fn create_order(&self, request: OrderRequest) -> CoreResult<Order> {
        self.run("create_order", self.create_order_inner(request)).await
    }

    async fn create_order_inner(&self, request: OrderRequest) -> CoreResult<Order> {
        let interval = request.validate()?;

        let car = self.store.find_car(&request.car_no).await?;
        let car_orders = match car {
            Some(_) => self.store.orders_by_car(&request.car_no).await?,
            None => Vec::new(),
        };
        let renter_orders = self.store.orders_by_renter(&request.renter_email).await?;

        admit_order(
            &request,
            &interval,
            car.as_ref(),
            &car_orders,
            &renter_orders,
            self.config.boundary_policy,
        )?;

        let order = open_order(&request, interval, Uuid::new_v4().to_string(), self.clock.now());
        self.store.insert_order(&order).await?;

        info!(
            order_id = %order.id,
            car_no = %order.car_no,
            renter = %order.renter_email,
            "Order created"
        );
        Ok(order)
    }

    /// Cancels a Pending order on behalf of its renter.
    pub async fn cancel_order(&self, renter_email: &str, order_id: &str) -> CoreResult<Order> {
        self.run("cancel_order", self.cancel_order_inner(renter_email, order_id)).await
    }

    async fn cancel_order_inner(&self, renter_email: &str, order_id: &str) -> CoreResult<Order> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        let review = self.store.find_review_by_order(&order.id).await?;

        let cancelled = authorize_cancel(&order, renter_email, review.as_ref())?;
        self.write_status(&cancelled).await?;

        info!(order_id = %cancelled.id, car_no = %cancelled.car_no, "Order cancelled");
        Ok(cancelled)
    }

    /// Records the renter's review and completes the order.
    pub async fn submit_review(&self, request: ReviewRequest) -> CoreResult<SubmittedReview> {
        self.run("submit_review", self.submit_review_inner(request)).await
    }

    async fn submit_review_inner(&self, request: ReviewRequest) -> CoreResult<SubmittedReview> {
        request.validate()?;

        let order = self
            .store
            .find_order(&request.order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(request.order_id.clone()))?;
        let existing = self.store.find_review_by_order(&order.id).await?;

        let step = authorize_review(&order, &request.renter_email, existing.as_ref())?;

        let review = request.into_review(Uuid::new_v4().to_string(), self.clock.now());
        match self.store.insert_review(&review).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(CoreError::AlreadyReviewed(order.id.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        let order = match step {
            CompletionStep::MarkCompleted(completed) => {
                self.write_status(&completed).await?;
                completed
            }
            CompletionStep::AlreadyCompleted => order,
        };

        info!(
            order_id = %order.id,
            rating = review.rating,
            bonus = %review.bonus(),
            "Order reviewed and completed"
        );
        Ok(SubmittedReview { review, order })
    }

    /// Replaces the stored order; any failure to apply is `UpdateFailed`.
    async fn write_status(&self, order: &Order) -> CoreResult<()> {
        match self.store.replace_order(order).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!(order_id = %order.id, status = %order.status, "Order replace matched no row");
                Err(CoreError::UpdateFailed(order.id.clone()))
            }
            Err(err) => {
                error!(order_id = %order.id, error = %err, "Order replace failed");
                Err(CoreError::UpdateFailed(order.id.clone()))
            }
        }
    }

    // =========================================================================
    // Read Models
    // =========================================================================

    /// Composed detail for one order.
    pub async fn get_order_detail(&self, order_id: &str) -> CoreResult<OrderDetail> {
        self.run("get_order_detail", self.get_order_detail_inner(order_id)).await
    }

    async fn get_order_detail_inner(&self, order_id: &str) -> CoreResult<OrderDetail> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let car = self.store.find_car(&order.car_no).await?;

        let (car_type, owner, fleet) = match &car {
            Some(car) => (
                self.store.find_car_type(&car.car_type_id).await?,
                self.store.find_user(&car.owner_email).await?,
                Some(self.load_fleet(&car.owner_email).await?),
            ),
            None => (None, None, None),
        };

        let owner_rating = fleet.as_ref().map(Fleet::rating).unwrap_or_default();
        let mut reviews = fleet.map(|f| f.reviews).unwrap_or_default();
        if reviews.get(&order.id).is_none() {
            if let Some(review) = self.store.find_review_by_order(&order.id).await? {
                reviews.insert(review);
            }
        }

        Ok(order_detail(
            &order,
            car.as_ref(),
            car_type.as_ref(),
            owner.as_ref(),
            owner_rating,
            &reviews,
        ))
    }

    /// The owner's cars with type and rating.
    pub async fn list_cars(&self, owner_email: &str) -> CoreResult<Vec<CarListing>> {
        self.run("list_cars", self.list_cars_inner(owner_email)).await
    }

    async fn list_cars_inner(&self, owner_email: &str) -> CoreResult<Vec<CarListing>> {
        let fleet = self.load_fleet(owner_email).await?;
        Ok(car_listings(&fleet.entries, &fleet.reviews))
    }

    /// The owner's business dashboard: bookings on every car, newest first.
    pub async fn list_orders(&self, owner_email: &str) -> CoreResult<Vec<BookingRow>> {
        self.run("list_orders", self.list_orders_inner(owner_email)).await
    }

    async fn list_orders_inner(&self, owner_email: &str) -> CoreResult<Vec<BookingRow>> {
        let fleet = self.load_fleet(owner_email).await?;
        let renters = self.load_users(fleet.renter_emails()).await?;
        Ok(booking_rows(&fleet.entries, &renters, self.clock.now()))
    }

    /// Revenue lines across the owner's cars plus today's earnings.
    pub async fn list_revenue(&self, owner_email: &str) -> CoreResult<RevenueReport> {
        self.run("list_revenue", self.list_revenue_inner(owner_email)).await
    }

    async fn list_revenue_inner(&self, owner_email: &str) -> CoreResult<RevenueReport> {
        let fleet = self.load_fleet(owner_email).await?;
        let renters = self.load_users(fleet.renter_emails()).await?;
        Ok(revenue_report(
            &fleet.entries,
            &fleet.reviews,
            &renters,
            self.config.earned_today_rule,
            self.clock.now(),
        ))
    }

    /// Reviews left on the owner's cars, most recent first.
    pub async fn list_reviews(&self, owner_email: &str) -> CoreResult<Vec<ReviewRow>> {
        self.run("list_reviews", self.list_reviews_inner(owner_email)).await
    }

    async fn list_reviews_inner(&self, owner_email: &str) -> CoreResult<Vec<ReviewRow>> {
        let fleet = self.load_fleet(owner_email).await?;
        let renters = self.load_users(fleet.renter_emails()).await?;
        Ok(review_rows(
            &fleet.entries,
            &fleet.reviews,
            &renters,
            self.clock.now(),
        ))
    }

    /// A renter's own orders with totals and owner identity.
    pub async fn list_user_orders(&self, renter_email: &str) -> CoreResult<Vec<UserOrderRow>> {
        self.run("list_user_orders", self.list_user_orders_inner(renter_email)).await
    }

    async fn list_user_orders_inner(&self, renter_email: &str) -> CoreResult<Vec<UserOrderRow>> {
        let orders = self.store.orders_by_renter(renter_email).await?;

        let mut cars: HashMap<String, Car> = HashMap::new();
        let mut reviews = ReviewIndex::new();
        for order in &orders {
            if !cars.contains_key(&order.car_no) {
                if let Some(car) = self.store.find_car(&order.car_no).await? {
                    cars.insert(car.car_no.clone(), car);
                }
            }
            if let Some(review) = self.store.find_review_by_order(&order.id).await? {
                reviews.insert(review);
            }
        }

        let owner_emails: HashSet<String> =
            cars.values().map(|c| c.owner_email.clone()).collect();
        let owners = self.load_users(owner_emails).await?;

        Ok(user_order_rows(&orders, &cars, &reviews, &owners))
    }

    // =========================================================================
    // Loading
    // =========================================================================

    async fn load_fleet(&self, owner_email: &str) -> CoreResult<Fleet> {
        let cars = self.store.cars_by_owner(owner_email).await?;
        debug!(owner = %owner_email, cars = cars.len(), "Loading fleet");

        let mut entries = Vec::with_capacity(cars.len());
        let mut reviews = ReviewIndex::new();

        for car in cars {
            let car_type = self.store.find_car_type(&car.car_type_id).await?;
            let orders = self.store.orders_by_car(&car.car_no).await?;
            for order in &orders {
                if let Some(review) = self.store.find_review_by_order(&order.id).await? {
                    reviews.insert(review);
                }
            }
            entries.push(FleetEntry {
                car,
                car_type,
                orders,
            });
        }

        Ok(Fleet { entries, reviews })
    }

    async fn load_users(&self, emails: HashSet<String>) -> CoreResult<UserDirectory> {
        let mut users = Vec::with_capacity(emails.len());
        for email in emails {
            if let Some(user) = self.store.find_user(&email).await? {
                users.push(user);
            }
        }
        Ok(users.into_iter().collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
