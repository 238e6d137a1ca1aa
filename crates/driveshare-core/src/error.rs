//! # Error Types
//!
//! Domain-specific error types for driveshare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  driveshare-core errors (this file)                                    │
//! │  ├── CoreError        - Every operation-level failure                  │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - Store failures seen through the capability     │
//! │                                                                         │
//! │  driveshare-db errors (separate crate)                                 │
//! │  └── DbError          - SQLite failures, mapped into StoreError        │
//! │                                                                         │
//! │  Flow: DbError → StoreError → CoreError → caller (HTTP layer)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! Every [`CoreError`] belongs to exactly one [`ErrorKind`]. The HTTP layer
//! maps kinds to status codes; security-class failures are additionally
//! logged on the `driveshare::security` target by the service layer.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input (`from >= to`, empty car number, rating out of range).
    Validation,
    /// Booking overlap or a transition out of a terminal state.
    Conflict,
    /// Email, car or order absent.
    NotFound,
    /// Identity mismatch on a mutating call, or a duplicate review attempt.
    SecurityViolation,
    /// Unique-constraint violation on insert.
    Duplicate,
    /// Store failure or deadline breach.
    Upstream,
}

// =============================================================================
// Core Error
// =============================================================================

/// Reservation errors returned by every caller-facing operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The car number used in a booking is not registered.
    #[error("Car not registered: {0}")]
    CarNotRegistered(String),

    /// Another booking already holds the car for an overlapping window.
    ///
    /// ## User Workflow
    /// ```text
    /// Renter X holds C1 for [Jan1, Jan3)
    ///      │
    ///      ▼
    /// Renter Y asks C1 for [Jan2, Jan4)
    ///      │
    ///      ▼
    /// OrderedByOthers { car_no: "C1" }
    /// ```
    #[error("Car {car_no} is already booked by another renter for that time")]
    OrderedByOthers { car_no: String },

    /// The renter already holds another booking for an overlapping window.
    #[error("{renter_email} already has a booking for that time")]
    OrderedSameTime { renter_email: String },

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Email is not registered.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Caller tried to act on an order that belongs to someone else.
    #[error("Order {order_id} does not belong to {email}")]
    OrderEmailMismatch { order_id: String, email: String },

    /// A review already exists for this order.
    ///
    /// Returned for a second review and for cancelling a reviewed order,
    /// whatever the stored status.
    #[error("Order {0} has already been reviewed")]
    AlreadyReviewed(String),

    /// Order is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Cancelling a Completed or Cancelled order
    /// - Reviewing a Cancelled order
    #[error("Order {order_id} is {status:?}, cannot perform operation")]
    InvalidOrderStatus { order_id: String, status: OrderStatus },

    /// The store did not apply a status change.
    #[error("Unable to update order {0}")]
    UpdateFailed(String),

    /// Unique constraint violation reported by the store.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Store failure.
    #[error("Store failure: {0}")]
    Upstream(String),

    /// The request ran past its deadline; outstanding store calls were dropped.
    #[error("Request exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::OrderedByOthers { .. }
            | CoreError::OrderedSameTime { .. }
            | CoreError::InvalidOrderStatus { .. } => ErrorKind::Conflict,
            CoreError::CarNotRegistered(_)
            | CoreError::OrderNotFound(_)
            | CoreError::UserNotFound(_) => ErrorKind::NotFound,
            CoreError::OrderEmailMismatch { .. } | CoreError::AlreadyReviewed(_) => {
                ErrorKind::SecurityViolation
            }
            CoreError::Duplicate { .. } => ErrorKind::Duplicate,
            CoreError::UpdateFailed(_)
            | CoreError::Upstream(_)
            | CoreError::DeadlineExceeded(_) => ErrorKind::Upstream,
        }
    }

    /// True for failures that should be audited as suspicious access.
    pub fn is_security_violation(&self) -> bool {
        self.kind() == ErrorKind::SecurityViolation
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any store call runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Booking window does not start before it ends.
    #[error("Wrong time selection: from ({from}) must be before to ({to})")]
    InvalidInterval { from: String, to: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a [`crate::store::ReservationStore`] implementation.
///
/// `Duplicate` is the only signal the core uses to tell a unique-constraint
/// violation apart from other write failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violation on insert.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Any other backend failure.
    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field, value } => CoreError::Duplicate { field, value },
            StoreError::Backend(message) => CoreError::Upstream(message),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OrderedByOthers {
            car_no: "C1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Car C1 is already booked by another renter for that time"
        );

        let err = CoreError::InvalidOrderStatus {
            order_id: "o-1".to_string(),
            status: OrderStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Order o-1 is Cancelled, cannot perform operation"
        );
    }

    #[test]
    fn test_security_class_is_distinct_from_not_found() {
        let mismatch = CoreError::OrderEmailMismatch {
            order_id: "o-1".to_string(),
            email: "mallory@example.com".to_string(),
        };
        let missing = CoreError::OrderNotFound("o-1".to_string());

        assert_eq!(mismatch.kind(), ErrorKind::SecurityViolation);
        assert!(mismatch.is_security_violation());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(!missing.is_security_violation());
        assert_eq!(
            CoreError::AlreadyReviewed("o-1".to_string()).kind(),
            ErrorKind::SecurityViolation
        );
    }

    #[test]
    fn test_deadline_is_upstream() {
        let err = CoreError::DeadlineExceeded(Duration::from_secs(10));
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_store_error_conversion() {
        let dup: CoreError = StoreError::duplicate("cars.car_no", "C1").into();
        assert!(matches!(dup, CoreError::Duplicate { .. }));
        assert_eq!(dup.kind(), ErrorKind::Duplicate);

        let backend: CoreError = StoreError::Backend("disk full".to_string()).into();
        assert_eq!(backend.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "car_no".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
