//! # Domain Types
//!
//! Core domain types used throughout DriveShare.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │       Car       │   │    CarType      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  owner_email    │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  car_no (key)   │──►│  brand, model   │       │
//! │  │  username       │   │  car_type_id    │   │  seats, gearbox │       │
//! │  └─────────────────┘   │  daily_price    │   │  fuel           │       │
//! │          ▲             └─────────────────┘   └─────────────────┘       │
//! │          │                     ▲                                        │
//! │  ┌───────┴─────────┐           │             ┌─────────────────┐       │
//! │  │      Order      │───────────┘             │     Review      │       │
//! │  │  ─────────────  │                         │  ─────────────  │       │
//! │  │  id (UUID)      │◄────────────────────────│  order_id (1:1) │       │
//! │  │  renter_email   │                         │  rating, bonus  │       │
//! │  │  from, to       │                         │  reviewed_at    │       │
//! │  │  status         │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, used for relations (users, car types, orders)
//! - Business ID: `email` for users, `car_no` for cars

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::conflict::Interval;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Login Method
// =============================================================================

/// How a user signed up.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// Email and password on DriveShare itself.
    #[default]
    Driveshare,
    Google,
    Facebook,
    Apple,
}

impl LoginMethod {
    pub const ALL: [LoginMethod; 4] = [
        LoginMethod::Driveshare,
        LoginMethod::Google,
        LoginMethod::Facebook,
        LoginMethod::Apple,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LoginMethod::Driveshare => "driveshare",
            LoginMethod::Google => "google",
            LoginMethod::Facebook => "facebook",
            LoginMethod::Apple => "apple",
        }
    }
}

impl FromStr for LoginMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoginMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "login_method".to_string(),
                allowed: LoginMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered DriveShare user. Anyone can both rent and own cars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Email - the business identifier every other record refers to.
    pub email: String,

    pub first_name: String,
    pub last_name: String,

    /// Public handle shown on bookings and reviews.
    pub username: String,

    /// Avatar image URL (may be empty).
    pub avatar: String,

    pub login_method: LoginMethod,

    /// Opaque credential blob, stored as supplied. Never serialized out.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub credentials: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", as shown on order details.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Input for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub login_method: LoginMethod,
    /// Empty for third-party logins.
    #[serde(default)]
    pub credentials: String,
}

// =============================================================================
// Car Type
// =============================================================================

/// The descriptive attributes of a car model, without identity.
///
/// Two cars with the same spec share one [`CarType`] row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarTypeSpec {
    pub brand: String,
    /// Model name, e.g. "Corolla".
    pub model: String,
    pub seats: i64,
    /// "automatic" / "manual".
    pub gearbox: String,
    /// "petrol" / "diesel" / "electric" / ...
    pub fuel: String,
}

/// A stored car model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarType {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub seats: i64,
    pub gearbox: String,
    pub fuel: String,
}

impl CarType {
    /// Materializes a spec under a fresh identifier.
    pub fn from_spec(id: impl Into<String>, spec: CarTypeSpec) -> Self {
        CarType {
            id: id.into(),
            brand: spec.brand,
            model: spec.model,
            seats: spec.seats,
            gearbox: spec.gearbox,
            fuel: spec.fuel,
        }
    }

    pub fn spec(&self) -> CarTypeSpec {
        CarTypeSpec {
            brand: self.brand.clone(),
            model: self.model.clone(),
            seats: self.seats,
            gearbox: self.gearbox.clone(),
            fuel: self.fuel.clone(),
        }
    }

    /// "Brand Model", as shown on the owner's booking dashboard.
    pub fn description(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

// =============================================================================
// Car
// =============================================================================

/// A rentable car, identified by its registration number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Car {
    /// Registration plate - unique business key.
    pub car_no: String,

    /// Owner's email.
    pub owner_email: String,

    /// References [`CarType::id`].
    pub car_type_id: String,

    /// Price per started day, in cents.
    pub daily_price_cents: i64,

    pub avatar: String,

    /// Pick-up location.
    pub from_where: String,

    /// Drop-off location.
    pub to_where: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Returns the daily price as Money.
    #[inline]
    pub fn daily_price(&self) -> Money {
        Money::from_cents(self.daily_price_cents)
    }
}

/// Input for registering a car under an owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCar {
    pub car_no: String,
    pub spec: CarTypeSpec,
    pub daily_price_cents: i64,
    #[serde(default)]
    pub avatar: String,
    pub from_where: String,
    pub to_where: String,
}

// =============================================================================
// Order Status
// =============================================================================

/// Stored lifecycle state of an order.
///
/// ```text
///            cancel
///   Pending ───────► Cancelled
///      │
///      │ review
///      ▼
///   Completed
/// ```
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Booked, not yet reviewed or cancelled.
    #[default]
    Pending,
    /// Reviewed by the renter.
    Completed,
    /// Cancelled by the renter before completion.
    Cancelled,
}

impl OrderStatus {
    /// Active orders are the ones that hold the car.
    ///
    /// Cancelled orders never block a new booking.
    pub const fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Completed)
    }

    /// No transition leaves a terminal state.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The only legal moves are Pending → Completed and Pending → Cancelled.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Pay Method
// =============================================================================

/// How the renter intends to pay. Payment itself happens elsewhere.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PayMethod {
    #[default]
    CreditCard,
    Crypto,
}

impl PayMethod {
    pub const ALL: [PayMethod; 2] = [PayMethod::CreditCard, PayMethod::Crypto];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PayMethod::CreditCard => "credit_card",
            PayMethod::Crypto => "crypto",
        }
    }
}

impl FromStr for PayMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PayMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "pay_method".to_string(),
                allowed: PayMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A renter's booking of a car for `[from_time, to_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub renter_email: String,

    pub car_no: String,

    #[ts(as = "String")]
    pub from_time: DateTime<Utc>,

    #[ts(as = "String")]
    pub to_time: DateTime<Utc>,

    pub status: OrderStatus,

    pub pay_method: PayMethod,

    /// When the order was placed.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The booked window.
    pub fn interval(&self) -> Interval {
        Interval {
            from: self.from_time,
            to: self.to_time,
        }
    }

    /// Same order with a different stored status.
    pub fn with_status(&self, status: OrderStatus) -> Order {
        Order {
            status,
            ..self.clone()
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// A renter's review of a finished trip. At most one per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Review {
    pub id: String,

    /// References [`Order::id`] (unique).
    pub order_id: String,

    /// 0.0 ..= 5.0
    pub rating: f64,

    /// Tip on top of the rental cost, in cents.
    pub bonus_cents: i64,

    pub content: String,

    /// Photo URLs attached by the renter.
    pub avatars: Vec<String>,

    #[ts(as = "String")]
    pub reviewed_at: DateTime<Utc>,
}

impl Review {
    /// Returns the bonus as Money.
    #[inline]
    pub fn bonus(&self) -> Money {
        Money::from_cents(self.bonus_cents)
    }
}

/// Reviews keyed by order id, for joining against orders.
#[derive(Debug, Clone, Default)]
pub struct ReviewIndex {
    by_order: HashMap<String, Review>,
}

impl ReviewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, review: Review) {
        self.by_order.insert(review.order_id.clone(), review);
    }

    pub fn get(&self, order_id: &str) -> Option<&Review> {
        self.by_order.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.by_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_order.is_empty()
    }
}

impl FromIterator<Review> for ReviewIndex {
    fn from_iter<I: IntoIterator<Item = Review>>(iter: I) -> Self {
        let mut index = ReviewIndex::new();
        for review in iter {
            index.insert(review);
        }
        index
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_active_statuses() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::Completed.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn test_transitions_only_leave_pending() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));

        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_pay_method_parse() {
        assert_eq!("crypto".parse::<PayMethod>().unwrap(), PayMethod::Crypto);
        assert_eq!(
            " Credit_Card ".parse::<PayMethod>().unwrap(),
            PayMethod::CreditCard
        );
        assert!(matches!(
            "cash".parse::<PayMethod>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_login_method_parse() {
        assert_eq!("Google".parse::<LoginMethod>().unwrap(), LoginMethod::Google);
        assert!("myspace".parse::<LoginMethod>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        let json = serde_json::to_string(&PayMethod::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
    }

    #[test]
    fn test_car_type_spec_roundtrip_and_description() {
        let spec = CarTypeSpec {
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            seats: 5,
            gearbox: "automatic".to_string(),
            fuel: "petrol".to_string(),
        };
        let car_type = CarType::from_spec("t-1", spec.clone());
        assert_eq!(car_type.spec(), spec);
        assert_eq!(car_type.description(), "Toyota Corolla");
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let user = User {
            id: "u-1".to_string(),
            email: "a@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
            username: "ada".to_string(),
            avatar: String::new(),
            login_method: LoginMethod::Driveshare,
            credentials: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(user.full_name(), "Ada");
    }

    #[test]
    fn test_review_index_lookup() {
        let review = Review {
            id: "r-1".to_string(),
            order_id: "o-1".to_string(),
            rating: 4.0,
            bonus_cents: 150,
            content: String::new(),
            avatars: vec![],
            reviewed_at: Utc::now(),
        };
        let index: ReviewIndex = vec![review].into_iter().collect();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("o-1").map(|r| r.bonus()), Some(Money::from_cents(150)));
        assert!(index.get("o-2").is_none());
    }
}
