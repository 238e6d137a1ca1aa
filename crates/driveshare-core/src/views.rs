//! # Read-Model Projections
//!
//! Pure composition of stored records into dashboard rows. The service layer
//! loads the records, this module joins, prices, rates and sorts them.
//!
//! ## Views
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  View              Joins                              Order             │
//! │  ───────────────   ───────────────────────────────    ───────────────   │
//! │  car list          Car + CarType + rating             owner's car order │
//! │  bookings          Car + Order + label + renter       from_time desc    │
//! │  user orders       Order + Car price + bonus + owner  store order       │
//! │  revenue           Car + Order + pricing              owner's car order │
//! │  reviews           Car + Order + Review + renter      reviewed_at desc  │
//! │  order detail      Order + Car + CarType + owner      single row        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing joins degrade to empty strings and zero amounts; an absent review
//! means rating and bonus contribute nothing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::lifecycle::{display_status, DisplayStatus};
use crate::money::Money;
use crate::pricing::{earned_today, order_bonus, order_cost, revenue_line, EarnedTodayRule, RevenueLine};
use crate::rating::{tally_orders, RatingTally};
use crate::types::{Car, CarType, Order, OrderStatus, PayMethod, ReviewIndex, User};

// =============================================================================
// Inputs
// =============================================================================

/// One of an owner's cars with everything needed to render it.
#[derive(Debug, Clone)]
pub struct FleetEntry {
    pub car: Car,
    /// `None` if the type row is missing.
    pub car_type: Option<CarType>,
    /// Every order ever placed on this car.
    pub orders: Vec<Order>,
}

impl FleetEntry {
    fn description(&self) -> String {
        self.car_type
            .as_ref()
            .map(CarType::description)
            .unwrap_or_default()
    }

    pub fn rating(&self, reviews: &ReviewIndex) -> RatingTally {
        tally_orders(&self.orders, reviews)
    }
}

/// Users keyed by email.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_email: HashMap<String, User>,
}

impl UserDirectory {
    pub fn get(&self, email: &str) -> Option<&User> {
        self.by_email.get(email)
    }

    pub fn username(&self, email: &str) -> String {
        self.get(email).map(|u| u.username.clone()).unwrap_or_default()
    }

    pub fn avatar(&self, email: &str) -> String {
        self.get(email).map(|u| u.avatar.clone()).unwrap_or_default()
    }
}

impl FromIterator<User> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        UserDirectory {
            by_email: iter.into_iter().map(|u| (u.email.clone(), u)).collect(),
        }
    }
}

// =============================================================================
// Car List
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarListing {
    pub car_no: String,
    pub brand: String,
    pub model: String,
    pub seats: i64,
    pub gearbox: String,
    pub fuel: String,
    pub daily_price: Money,
    pub avatar: String,
    pub from_where: String,
    pub to_where: String,
    /// Mean rating, 0 when never reviewed.
    pub rating: f64,
    /// Reviewed trips.
    pub trips: u32,
}

/// Owner's cars with their ratings. A missing type row leaves the type
/// fields empty and seats at 0.
pub fn car_listings(fleet: &[FleetEntry], reviews: &ReviewIndex) -> Vec<CarListing> {
    fleet
        .iter()
        .map(|entry| {
            let spec = entry
                .car_type
                .as_ref()
                .map(CarType::spec)
                .unwrap_or_default();
            let tally = entry.rating(reviews);
            CarListing {
                car_no: entry.car.car_no.clone(),
                brand: spec.brand,
                model: spec.model,
                seats: spec.seats,
                gearbox: spec.gearbox,
                fuel: spec.fuel,
                daily_price: entry.car.daily_price(),
                avatar: entry.car.avatar.clone(),
                from_where: entry.car.from_where.clone(),
                to_where: entry.car.to_where.clone(),
                rating: tally.mean(),
                trips: tally.trips,
            }
        })
        .collect()
}

// =============================================================================
// Business Dashboard (bookings on my cars)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingRow {
    pub order_id: String,
    pub car_no: String,
    /// "Brand Model".
    pub car_description: String,
    pub renter_email: String,
    pub renter_username: String,
    pub renter_avatar: String,
    #[ts(as = "String")]
    pub from_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub to_time: DateTime<Utc>,
    pub status: DisplayStatus,
}

/// Live bookings across the owner's cars, latest start first.
///
/// Cancelled orders are left out. Ties keep fleet order.
pub fn booking_rows(fleet: &[FleetEntry], users: &UserDirectory, now: DateTime<Utc>) -> Vec<BookingRow> {
    let mut rows: Vec<BookingRow> = fleet
        .iter()
        .flat_map(|entry| {
            let description = entry.description();
            entry
                .orders
                .iter()
                .filter(|order| order.status != OrderStatus::Cancelled)
                .map(move |order| BookingRow {
                    order_id: order.id.clone(),
                    car_no: order.car_no.clone(),
                    car_description: description.clone(),
                    renter_email: order.renter_email.clone(),
                    renter_username: users.username(&order.renter_email),
                    renter_avatar: users.avatar(&order.renter_email),
                    from_time: order.from_time,
                    to_time: order.to_time,
                    status: display_status(order.status, order.from_time, now),
                })
        })
        .collect();

    rows.sort_by(|a, b| b.from_time.cmp(&a.from_time));
    rows
}

// =============================================================================
// User Orders (my trips)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserOrderRow {
    pub order_id: String,
    pub car_no: String,
    pub owner_email: String,
    pub owner_username: String,
    pub status: OrderStatus,
    /// Cost plus bonus.
    pub total: Money,
    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
}

/// A renter's orders. Orders whose car is no longer registered are skipped.
pub fn user_order_rows(
    orders: &[Order],
    cars: &HashMap<String, Car>,
    reviews: &ReviewIndex,
    owners: &UserDirectory,
) -> Vec<UserOrderRow> {
    orders
        .iter()
        .filter_map(|order| {
            let car = cars.get(&order.car_no)?;
            let cost = order_cost(order, car.daily_price());
            Some(UserOrderRow {
                order_id: order.id.clone(),
                car_no: order.car_no.clone(),
                owner_email: car.owner_email.clone(),
                owner_username: owners.username(&car.owner_email),
                status: order.status,
                total: cost + order_bonus(reviews.get(&order.id)),
                ordered_at: order.created_at,
            })
        })
        .collect()
}

// =============================================================================
// Revenue
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueReport {
    pub lines: Vec<RevenueLine>,
    pub earned_today: Money,
}

/// Every non-cancelled order across the owner's cars, with the earned-today sum.
pub fn revenue_report(
    fleet: &[FleetEntry],
    reviews: &ReviewIndex,
    renters: &UserDirectory,
    rule: EarnedTodayRule,
    now: DateTime<Utc>,
) -> RevenueReport {
    let lines: Vec<RevenueLine> = fleet
        .iter()
        .flat_map(|entry| {
            entry
                .orders
                .iter()
                .filter(|order| order.status != OrderStatus::Cancelled)
                .map(move |order| {
                    revenue_line(
                        &entry.car,
                        order,
                        reviews.get(&order.id),
                        renters.username(&order.renter_email),
                    )
                })
        })
        .collect();

    let earned_today = earned_today(&lines, rule, now);
    RevenueReport { lines, earned_today }
}

// =============================================================================
// Reviews
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReviewRow {
    pub order_id: String,
    pub car_no: String,
    pub reviewer_email: String,
    pub reviewer_username: String,
    pub reviewer_avatar: String,
    pub rating: f64,
    pub content: String,
    pub avatars: Vec<String>,
    /// Started days since the review, `ceil(hours / 24)`.
    pub days_ago: i64,
    #[ts(as = "String")]
    pub reviewed_at: DateTime<Utc>,
}

/// Whole started days between `then` and `now`; 0 if `then` is in the future.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    crate::pricing::billable_days(then, now)
}

/// Reviews left on the owner's cars, newest first. Cancelled orders are skipped.
pub fn review_rows(
    fleet: &[FleetEntry],
    reviews: &ReviewIndex,
    users: &UserDirectory,
    now: DateTime<Utc>,
) -> Vec<ReviewRow> {
    let mut rows: Vec<ReviewRow> = fleet
        .iter()
        .flat_map(|entry| entry.orders.iter())
        .filter(|order| order.status != OrderStatus::Cancelled)
        .filter_map(|order| {
            let review = reviews.get(&order.id)?;
            Some(ReviewRow {
                order_id: order.id.clone(),
                car_no: order.car_no.clone(),
                reviewer_email: order.renter_email.clone(),
                reviewer_username: users.username(&order.renter_email),
                reviewer_avatar: users.avatar(&order.renter_email),
                rating: review.rating,
                content: review.content.clone(),
                avatars: review.avatars.clone(),
                days_ago: days_since(review.reviewed_at, now),
                reviewed_at: review.reviewed_at,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at));
    rows
}

// =============================================================================
// Order Detail
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order_id: String,
    pub renter_email: String,
    pub status: OrderStatus,
    pub pay_method: PayMethod,
    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub from_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub to_time: DateTime<Utc>,

    pub car_no: String,
    pub car_avatar: String,
    pub car_description: String,
    pub from_where: String,
    pub to_where: String,

    pub owner_email: String,
    pub owner_name: String,
    /// Reviewed trips across all the owner's cars.
    pub owner_trips: u32,
    /// Overall rating across all the owner's cars.
    pub owner_rating: f64,

    pub price_per_day: Money,
    pub cost: Money,
    pub bonus: Money,
    pub total: Money,
}

/// Everything a renter sees about one order.
pub fn order_detail(
    order: &Order,
    car: Option<&Car>,
    car_type: Option<&CarType>,
    owner: Option<&User>,
    owner_rating: RatingTally,
    reviews: &ReviewIndex,
) -> OrderDetail {
    let price_per_day = car.map(Car::daily_price).unwrap_or_default();
    let cost = order_cost(order, price_per_day);
    let bonus = order_bonus(reviews.get(&order.id));

    OrderDetail {
        order_id: order.id.clone(),
        renter_email: order.renter_email.clone(),
        status: order.status,
        pay_method: order.pay_method,
        ordered_at: order.created_at,
        from_time: order.from_time,
        to_time: order.to_time,
        car_no: order.car_no.clone(),
        car_avatar: car.map(|c| c.avatar.clone()).unwrap_or_default(),
        car_description: car_type.map(CarType::description).unwrap_or_default(),
        from_where: car.map(|c| c.from_where.clone()).unwrap_or_default(),
        to_where: car.map(|c| c.to_where.clone()).unwrap_or_default(),
        owner_email: car.map(|c| c.owner_email.clone()).unwrap_or_default(),
        owner_name: owner.map(User::full_name).unwrap_or_default(),
        owner_trips: owner_rating.trips,
        owner_rating: owner_rating.mean(),
        price_per_day,
        cost,
        bonus,
        total: cost + bonus,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
