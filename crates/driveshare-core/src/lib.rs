//! # driveshare-core: Pure Reservation Logic for DriveShare
//!
//! This crate is the **heart** of the DriveShare reservation backend. It
//! contains the booking rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DriveShare Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP layer / auth (external collaborators)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        driveshare-service (deadlines, orchestration)            │   │
//! │  │   create_order, cancel_order, submit_review, list_* ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ driveshare-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌───────────┐ ┌─────────┐ ┌────────┐ ┌───────┐  │   │
//! │  │  │ conflict │ │ lifecycle │ │ pricing │ │ rating │ │ views │  │   │
//! │  │  └──────────┘ └───────────┘ └─────────┘ └────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ReservationStore (trait)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 driveshare-db (SQLite store)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, CarType, Order, Review, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types and the error taxonomy
//! - [`validation`] - Input validation
//! - [`conflict`] - Booking interval conflict detection
//! - [`lifecycle`] - Order state machine and transition guards
//! - [`pricing`] - Rental cost, revenue lines, earned-today rule
//! - [`rating`] - Safe mean ratings per car and per owner
//! - [`views`] - Read-model projections for dashboards
//! - [`store`] - The storage capability the service layer is built on
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use driveshare_core::money::Money;
//! use driveshare_core::pricing::billable_days;
//!
//! let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let to = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
//!
//! // 25 hours bill as two full days
//! let days = billable_days(from, to);
//! assert_eq!(days, 2);
//! assert_eq!(Money::from_cents(100).times(days).cents(), 200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod rating;
pub mod store;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use conflict::{BoundaryPolicy, Interval, Scope, DEFAULT_BOUNDARY_POLICY};
pub use error::{CoreError, CoreResult, ErrorKind, StoreError, ValidationError};
pub use lifecycle::{DisplayStatus, OrderRequest, ReviewRequest};
pub use money::Money;
pub use pricing::EarnedTodayRule;
pub use rating::RatingTally;
pub use store::{ReservationStore, StoreResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a car registration number.
pub const MAX_CAR_NO_LEN: usize = 20;

/// Highest rating a renter can give.
pub const MAX_RATING: f64 = 5.0;

/// Maximum seat count accepted for a car type.
pub const MAX_SEATS: i64 = 99;

/// Maximum length of review content.
pub const MAX_REVIEW_CONTENT_LEN: usize = 2000;

/// Largest bonus a renter can attach to a review (100,000.00).
pub const MAX_BONUS_CENTS: i64 = 10_000_000;

/// Largest daily price accepted for a car (100,000.00).
pub const MAX_DAILY_PRICE_CENTS: i64 = 10_000_000;
