//! # Validation Module
//!
//! Input validation for DriveShare operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer                                                   │
//! │  └── Deserialization, auth token checks                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: driveshare-service                                           │
//! │  └── THIS MODULE: field rules, run before any store call               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store                                                        │
//! │  ├── UNIQUE (users.email, cars.car_no, reviews.order_id)               │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use driveshare_core::validation::{validate_car_no, validate_rating};
//!
//! validate_car_no("ABC-1234").unwrap();
//! validate_rating(4.5).unwrap();
//! ```

use chrono::{DateTime, Utc};

use crate::conflict::Interval;
use crate::error::ValidationError;
use crate::types::{NewCar, NewUser};
use crate::{
    MAX_BONUS_CENTS, MAX_CAR_NO_LEN, MAX_DAILY_PRICE_CENTS, MAX_RATING, MAX_REVIEW_CONTENT_LEN,
    MAX_SEATS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a car registration number.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Only letters, digits and hyphens, with no surrounding whitespace
///
/// ## Example
/// ```rust
/// use driveshare_core::validation::validate_car_no;
///
/// assert!(validate_car_no("29A-12345").is_ok());
/// assert!(validate_car_no("").is_err());
/// assert!(validate_car_no("AB 12").is_err());
/// ```
pub fn validate_car_no(car_no: &str) -> ValidationResult<()> {
    if car_no.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "car_no".to_string(),
        });
    }

    if car_no.chars().count() > MAX_CAR_NO_LEN {
        return Err(ValidationError::TooLong {
            field: "car_no".to_string(),
            max: MAX_CAR_NO_LEN,
        });
    }

    if !car_no.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "car_no".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address syntactically.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with something on both sides
/// - No whitespace
///
/// Deliverability is not checked.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("must look like name@domain")),
    }
}

/// Validates that a display field is present.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates review content length.
pub fn validate_review_content(content: &str) -> ValidationResult<()> {
    if content.chars().count() > MAX_REVIEW_CONTENT_LEN {
        return Err(ValidationError::TooLong {
            field: "content".to_string(),
            max: MAX_REVIEW_CONTENT_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a review rating.
///
/// ## Rules
/// - Finite
/// - Within `0.0 ..= 5.0`
///
/// ## Example
/// ```rust
/// use driveshare_core::validation::validate_rating;
///
/// assert!(validate_rating(0.0).is_ok());
/// assert!(validate_rating(5.0).is_ok());
/// assert!(validate_rating(5.5).is_err());
/// assert!(validate_rating(f64::NAN).is_err());
/// ```
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: MAX_RATING as i64,
        });
    }
    Ok(())
}

/// Validates a review bonus in cents. Zero is allowed.
pub fn validate_bonus_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_BONUS_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "bonus".to_string(),
            min: 0,
            max: MAX_BONUS_CENTS,
        });
    }
    Ok(())
}

/// Validates a daily price in cents. Must be strictly positive and at most
/// [`MAX_DAILY_PRICE_CENTS`].
pub fn validate_daily_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "daily_price".to_string(),
        });
    }
    if cents > MAX_DAILY_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "daily_price".to_string(),
            min: 1,
            max: MAX_DAILY_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Validates a seat count.
pub fn validate_seats(seats: i64) -> ValidationResult<()> {
    if !(1..=MAX_SEATS).contains(&seats) {
        return Err(ValidationError::OutOfRange {
            field: "seats".to_string(),
            min: 1,
            max: MAX_SEATS,
        });
    }
    Ok(())
}

// =============================================================================
// Interval Validators
// =============================================================================

/// Validates a booking window and returns it as an [`Interval`].
///
/// ## User Workflow
/// ```text
/// Renter picks pick-up and drop-off times
///      │
///      ▼
/// validate_interval(from, to) ← THIS FUNCTION
///      │
///      ├── from >= to? → Error: "Wrong time selection"
///      │
///      └── OK → conflict detection
/// ```
pub fn validate_interval(from: DateTime<Utc>, to: DateTime<Utc>) -> ValidationResult<Interval> {
    Interval::new(from, to)
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a user registration.
pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    validate_email(&user.email)?;
    validate_required("username", &user.username)?;
    validate_required("first_name", &user.first_name)?;
    Ok(())
}

/// Validates a car registration.
pub fn validate_new_car(car: &NewCar) -> ValidationResult<()> {
    validate_car_no(&car.car_no)?;
    validate_daily_price_cents(car.daily_price_cents)?;
    validate_required("brand", &car.spec.brand)?;
    validate_required("model", &car.spec.model)?;
    validate_seats(car.spec.seats)?;
    validate_required("from_where", &car.from_where)?;
    validate_required("to_where", &car.to_where)?;
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use driveshare_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
