//! # Conflict Detection
//!
//! Decides whether a requested booking window collides with an existing one.
//!
//! ## Scopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order(renter R, car C, [from, to))                              │
//! │                                                                         │
//! │  Car scope     every active order on C, any renter  → OrderedByOthers  │
//! │  Renter scope  every active order by R, any car     → OrderedSameTime  │
//! │                                                                         │
//! │  Active = Pending or Completed. Cancelled orders never block.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Intersection Test
//! Intervals are half-open: `[from, to)`. Two intervals intersect iff
//! `f1 < t2 && f2 < t1`, so a booking may start at the exact instant the
//! previous one ends. [`BoundaryPolicy::Closed`] treats the end instant as
//! occupied and makes touching bookings conflict.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Order;

// =============================================================================
// Boundary Policy
// =============================================================================

/// How the end instant of a booking is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// `[from, to)`: back-to-back bookings are allowed.
    #[default]
    HalfOpen,
    /// `[from, to]`: touching bookings conflict.
    Closed,
}

/// The policy used when none is configured.
pub const DEFAULT_BOUNDARY_POLICY: BoundaryPolicy = BoundaryPolicy::HalfOpen;

impl BoundaryPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::HalfOpen => "half_open",
            BoundaryPolicy::Closed => "closed",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "half_open" => Ok(BoundaryPolicy::HalfOpen),
            "closed" => Ok(BoundaryPolicy::Closed),
            _ => Err(ValidationError::NotAllowed {
                field: "boundary_policy".to_string(),
                allowed: vec!["half_open".to_string(), "closed".to_string()],
            }),
        }
    }
}

// =============================================================================
// Interval
// =============================================================================

/// A booking window. `from < to` holds for every interval built with [`Interval::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Interval {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
}

impl Interval {
    /// Builds a window, rejecting empty or inverted ranges.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if from >= to {
            return Err(ValidationError::InvalidInterval {
                from: from.to_rfc3339(),
                to: to.to_rfc3339(),
            });
        }
        Ok(Interval { from, to })
    }

    /// Intersection test under the given policy.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use driveshare_core::conflict::{BoundaryPolicy, Interval};
    ///
    /// let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
    /// let first = Interval::new(day(1), day(3)).unwrap();
    /// let next = Interval::new(day(3), day(5)).unwrap();
    ///
    /// assert!(!first.overlaps(&next, BoundaryPolicy::HalfOpen));
    /// assert!(first.overlaps(&next, BoundaryPolicy::Closed));
    /// ```
    pub fn overlaps(&self, other: &Interval, policy: BoundaryPolicy) -> bool {
        match policy {
            BoundaryPolicy::HalfOpen => self.from < other.to && other.from < self.to,
            BoundaryPolicy::Closed => self.from <= other.to && other.from <= self.to,
        }
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Which existing orders a candidate window is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every order on this car.
    Car(&'a str),
    /// Every order placed by this renter.
    Renter(&'a str),
}

impl Scope<'_> {
    pub fn contains(&self, order: &Order) -> bool {
        match self {
            Scope::Car(car_no) => order.car_no == *car_no,
            Scope::Renter(email) => order.renter_email == *email,
        }
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Returns the first active order in `scope` whose window intersects `candidate`.
pub fn find_conflict<'o, I>(
    candidate: &Interval,
    scope: Scope<'_>,
    orders: I,
    policy: BoundaryPolicy,
) -> Option<&'o Order>
where
    I: IntoIterator<Item = &'o Order>,
{
    orders.into_iter().find(|order| {
        order.status.is_active()
            && scope.contains(order)
            && order.interval().overlaps(candidate, policy)
    })
}

/// True if any active order in `scope` intersects `candidate`.
pub fn has_conflict<'o, I>(
    candidate: &Interval,
    scope: Scope<'_>,
    orders: I,
    policy: BoundaryPolicy,
) -> bool
where
    I: IntoIterator<Item = &'o Order>,
{
    find_conflict(candidate, scope, orders, policy).is_some()
}

// =============================================================================
// Unit Tests
// =============================================================================
