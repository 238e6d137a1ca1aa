//! # Order Lifecycle
//!
//! Pure guards for every order transition. The service layer performs the
//! store reads, calls into this module, and only writes when it says so.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   create ──► Pending ──── cancel (renter) ────► Cancelled  (terminal)   │
//! │                 │                                                       │
//! │                 └──────── review (renter) ────► Completed  (terminal)   │
//! │                                                                         │
//! │   Every rejection is a typed CoreError; nothing is partially applied   │
//! │   by these guards.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Display Labels
//! `Upcoming` and `Ongoing` are never stored. They are derived from the
//! stored status, the booking start and the caller's `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::conflict::{find_conflict, BoundaryPolicy, Interval, Scope};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Car, Order, OrderStatus, PayMethod, Review};
use crate::validation::{
    validate_bonus_cents, validate_car_no, validate_email, validate_interval, validate_rating,
    validate_required, validate_review_content,
};

// =============================================================================
// Display Status
// =============================================================================

/// Label shown on the owner's booking dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// Pending, trip has not started yet.
    Upcoming,
    /// Pending, trip has started.
    Ongoing,
    Completed,
    Cancelled,
}

/// Derives the dashboard label from `(status, from, now)`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use driveshare_core::lifecycle::{display_status, DisplayStatus};
/// use driveshare_core::types::OrderStatus;
///
/// let now = Utc::now();
/// let tomorrow = now + Duration::days(1);
/// assert_eq!(display_status(OrderStatus::Pending, tomorrow, now), DisplayStatus::Upcoming);
/// assert_eq!(display_status(OrderStatus::Pending, now, now), DisplayStatus::Ongoing);
/// ```
pub fn display_status(status: OrderStatus, from: DateTime<Utc>, now: DateTime<Utc>) -> DisplayStatus {
    match status {
        OrderStatus::Pending if from > now => DisplayStatus::Upcoming,
        OrderStatus::Pending => DisplayStatus::Ongoing,
        OrderStatus::Completed => DisplayStatus::Completed,
        OrderStatus::Cancelled => DisplayStatus::Cancelled,
    }
}

// =============================================================================
// Transition Guard
// =============================================================================

/// Returns `order` moved to `next`, or `InvalidOrderStatus` if the state
/// machine has no such edge.
pub fn transition(order: &Order, next: OrderStatus) -> CoreResult<Order> {
    if !order.status.can_transition_to(next) {
        return Err(CoreError::InvalidOrderStatus {
            order_id: order.id.clone(),
            status: order.status,
        });
    }
    Ok(order.with_status(next))
}

/// Identity check shared by every renter-initiated mutation.
pub fn authorize_renter(order: &Order, renter_email: &str) -> CoreResult<()> {
    if order.renter_email != renter_email {
        return Err(CoreError::OrderEmailMismatch {
            order_id: order.id.clone(),
            email: renter_email.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Create
// =============================================================================

/// A renter's booking request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub renter_email: String,
    pub car_no: String,
    #[ts(as = "String")]
    pub from_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub to_time: DateTime<Utc>,
    #[serde(default)]
    pub pay_method: PayMethod,
}

impl OrderRequest {
    /// Field checks; returns the validated window.
    pub fn validate(&self) -> Result<Interval, ValidationError> {
        validate_email(&self.renter_email)?;
        validate_car_no(&self.car_no)?;
        validate_interval(self.from_time, self.to_time)
    }
}

/// Decides whether a validated request may be booked.
///
/// ## Order of Checks
/// ```text
/// car registered?            no  → CarNotRegistered
///      │
/// car scope free?            no  → OrderedByOthers
///      │
/// renter scope free?         no  → OrderedSameTime
///      │
///      ▼
///     Ok
/// ```
pub fn admit_order(
    request: &OrderRequest,
    interval: &Interval,
    car: Option<&Car>,
    car_orders: &[Order],
    renter_orders: &[Order],
    policy: BoundaryPolicy,
) -> CoreResult<()> {
    if car.is_none() {
        return Err(CoreError::CarNotRegistered(request.car_no.clone()));
    }

    if find_conflict(interval, Scope::Car(&request.car_no), car_orders, policy).is_some() {
        return Err(CoreError::OrderedByOthers {
            car_no: request.car_no.clone(),
        });
    }

    if find_conflict(
        interval,
        Scope::Renter(&request.renter_email),
        renter_orders,
        policy,
    )
    .is_some()
    {
        return Err(CoreError::OrderedSameTime {
            renter_email: request.renter_email.clone(),
        });
    }

    Ok(())
}

/// Builds the Pending order for an admitted request.
pub fn open_order(
    request: &OrderRequest,
    interval: Interval,
    id: impl Into<String>,
    now: DateTime<Utc>,
) -> Order {
    Order {
        id: id.into(),
        renter_email: request.renter_email.clone(),
        car_no: request.car_no.clone(),
        from_time: interval.from,
        to_time: interval.to,
        status: OrderStatus::Pending,
        pay_method: request.pay_method,
        created_at: now,
    }
}

// =============================================================================
// Cancel
// =============================================================================

/// Checks a cancel request and returns the order as it should be stored.
///
/// A reviewed order is finished even when its status write never landed,
/// so it cannot be cancelled.
pub fn authorize_cancel(
    order: &Order,
    renter_email: &str,
    review: Option<&Review>,
) -> CoreResult<Order> {
    authorize_renter(order, renter_email)?;
    if review.is_some() {
        return Err(CoreError::AlreadyReviewed(order.id.clone()));
    }
    transition(order, OrderStatus::Cancelled)
}

// =============================================================================
// Review (Complete)
// =============================================================================

/// A renter's review submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReviewRequest {
    pub order_id: String,
    pub renter_email: String,
    pub rating: f64,
    #[serde(default)]
    pub bonus_cents: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub avatars: Vec<String>,
}

impl ReviewRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("order_id", &self.order_id)?;
        validate_email(&self.renter_email)?;
        validate_rating(self.rating)?;
        validate_bonus_cents(self.bonus_cents)?;
        validate_review_content(&self.content)
    }

    pub fn into_review(self, id: impl Into<String>, now: DateTime<Utc>) -> Review {
        Review {
            id: id.into(),
            order_id: self.order_id,
            rating: self.rating,
            bonus_cents: self.bonus_cents,
            content: self.content,
            avatars: self.avatars,
            reviewed_at: now,
        }
    }
}

/// What the store must do with the order once the review is inserted.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionStep {
    /// Replace the stored order with this Completed copy.
    MarkCompleted(Order),
    /// Order is already Completed; no second status write.
    AlreadyCompleted,
}

/// Checks a review submission against the stored order and any review
/// already attached to it.
pub fn authorize_review(
    order: &Order,
    renter_email: &str,
    existing: Option<&Review>,
) -> CoreResult<CompletionStep> {
    authorize_renter(order, renter_email)?;

    if existing.is_some() {
        return Err(CoreError::AlreadyReviewed(order.id.clone()));
    }

    match order.status {
        OrderStatus::Cancelled => Err(CoreError::InvalidOrderStatus {
            order_id: order.id.clone(),
            status: order.status,
        }),
        OrderStatus::Completed => Ok(CompletionStep::AlreadyCompleted),
        OrderStatus::Pending => Ok(CompletionStep::MarkCompleted(transition(
            order,
            OrderStatus::Completed,
        )?)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::DEFAULT_BOUNDARY_POLICY;
    use crate::error::ErrorKind;
    use chrono::{Duration, TimeZone};

    fn t(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn car(car_no: &str) -> Car {
        Car {
            car_no: car_no.to_string(),
            owner_email: "owner@example.com".to_string(),
            car_type_id: "type-1".to_string(),
            daily_price_cents: 4000,
            avatar: String::new(),
            from_where: "A".to_string(),
            to_where: "B".to_string(),
            created_at: t(-100),
        }
    }

    fn request(renter: &str, car_no: &str, from: i64, to: i64) -> OrderRequest {
        OrderRequest {
            renter_email: renter.to_string(),
            car_no: car_no.to_string(),
            from_time: t(from),
            to_time: t(to),
            pay_method: PayMethod::Crypto,
        }
    }

    fn pending(id: &str, renter: &str, car_no: &str, from: i64, to: i64) -> Order {
        let req = request(renter, car_no, from, to);
        let interval = req.validate().unwrap();
        open_order(&req, interval, id, t(-1))
    }

    fn review_for(order_id: &str) -> Review {
        Review {
            id: "r-1".to_string(),
            order_id: order_id.to_string(),
            rating: 5.0,
            bonus_cents: 0,
            content: String::new(),
            avatars: vec![],
            reviewed_at: t(0),
        }
    }

    #[test]
    fn test_display_status_derivation() {
        let now = t(10);
        assert_eq!(display_status(OrderStatus::Pending, t(11), now), DisplayStatus::Upcoming);
        assert_eq!(display_status(OrderStatus::Pending, t(10), now), DisplayStatus::Ongoing);
        assert_eq!(display_status(OrderStatus::Pending, t(0), now), DisplayStatus::Ongoing);
        assert_eq!(display_status(OrderStatus::Completed, t(11), now), DisplayStatus::Completed);
        assert_eq!(display_status(OrderStatus::Cancelled, t(11), now), DisplayStatus::Cancelled);
    }

    #[test]
    fn test_request_validation_rejects_inverted_window() {
        let err = request("x@example.com", "C1", 48, 0).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));
    }

    #[test]
    fn test_open_order_is_pending() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.pay_method, PayMethod::Crypto);
        assert_eq!(order.interval(), Interval::new(t(0), t(24)).unwrap());
    }

    #[test]
    fn test_admit_requires_registered_car() {
        let req = request("x@example.com", "C9", 0, 24);
        let interval = req.validate().unwrap();
        let err = admit_order(&req, &interval, None, &[], &[], DEFAULT_BOUNDARY_POLICY).unwrap_err();
        assert!(matches!(err, CoreError::CarNotRegistered(ref c) if c == "C9"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_admit_car_scope_before_renter_scope() {
        let c1 = car("C1");
        let held_by_other = vec![pending("o-1", "y@example.com", "C1", 0, 48)];
        let held_by_me = vec![pending("o-2", "x@example.com", "C2", 0, 48)];

        let req = request("x@example.com", "C1", 24, 72);
        let interval = req.validate().unwrap();

        let err = admit_order(
            &req,
            &interval,
            Some(&c1),
            &held_by_other,
            &held_by_me,
            DEFAULT_BOUNDARY_POLICY,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OrderedByOthers { .. }));

        let err = admit_order(&req, &interval, Some(&c1), &[], &held_by_me, DEFAULT_BOUNDARY_POLICY)
            .unwrap_err();
        assert!(matches!(err, CoreError::OrderedSameTime { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_admit_back_to_back() {
        let c1 = car("C1");
        let existing = vec![pending("o-1", "y@example.com", "C1", 0, 24)];
        let req = request("x@example.com", "C1", 24, 48);
        let interval = req.validate().unwrap();

        assert!(admit_order(&req, &interval, Some(&c1), &existing, &[], BoundaryPolicy::HalfOpen).is_ok());
        assert!(admit_order(&req, &interval, Some(&c1), &existing, &[], BoundaryPolicy::Closed).is_err());
    }

    #[test]
    fn test_cancel_pending_by_owner() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        let cancelled = authorize_cancel(&order, "x@example.com", None).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.id, order.id);
    }

    #[test]
    fn test_cancel_by_someone_else_is_security_violation() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        let err = authorize_cancel(&order, "y@example.com", None).unwrap_err();
        assert!(matches!(err, CoreError::OrderEmailMismatch { .. }));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_cancel_terminal_is_rejected() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            let err = authorize_cancel(&order.with_status(status), "x@example.com", None).unwrap_err();
            assert!(matches!(err, CoreError::InvalidOrderStatus { status: s, .. } if s == status));
        }
    }

    #[test]
    fn test_cancel_reviewed_pending_order_is_rejected() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        let existing = review_for("o-1");

        let err = authorize_cancel(&order, "x@example.com", Some(&existing)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReviewed(ref id) if id == "o-1"));

        // Ownership is still checked first
        let err = authorize_cancel(&order, "y@example.com", Some(&existing)).unwrap_err();
        assert!(matches!(err, CoreError::OrderEmailMismatch { .. }));
    }

    #[test]
    fn test_review_pending_marks_completed() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        match authorize_review(&order, "x@example.com", None).unwrap() {
            CompletionStep::MarkCompleted(done) => assert_eq!(done.status, OrderStatus::Completed),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn test_review_completed_without_review_skips_status_write() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24).with_status(OrderStatus::Completed);
        assert_eq!(
            authorize_review(&order, "x@example.com", None).unwrap(),
            CompletionStep::AlreadyCompleted
        );
    }

    #[test]
    fn test_second_review_is_rejected() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);
        let existing = review_for("o-1");

        let err = authorize_review(&order, "x@example.com", Some(&existing)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReviewed(_)));
        assert!(err.is_security_violation());

        let done = order.with_status(OrderStatus::Completed);
        let err = authorize_review(&done, "x@example.com", Some(&existing)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReviewed(_)));

        let cancelled = order.with_status(OrderStatus::Cancelled);
        let err = authorize_review(&cancelled, "x@example.com", Some(&existing)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReviewed(_)));
    }

    #[test]
    fn test_review_mismatch_and_cancelled() {
        let order = pending("o-1", "x@example.com", "C1", 0, 24);

        let err = authorize_review(&order, "y@example.com", None).unwrap_err();
        assert!(matches!(err, CoreError::OrderEmailMismatch { .. }));

        let cancelled = order.with_status(OrderStatus::Cancelled);
        let err = authorize_review(&cancelled, "x@example.com", None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOrderStatus { .. }));
    }

    #[test]
    fn test_review_request_validation() {
        let mut req = ReviewRequest {
            order_id: "o-1".to_string(),
            renter_email: "x@example.com".to_string(),
            rating: 4.0,
            bonus_cents: 200,
            content: "Clean car".to_string(),
            avatars: vec!["https://img/1.png".to_string()],
        };
        assert!(req.validate().is_ok());

        req.rating = 6.0;
        assert!(req.validate().is_err());

        req.rating = 4.0;
        req.bonus_cents = -1;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_review_stamps_time() {
        let req = ReviewRequest {
            order_id: "o-1".to_string(),
            renter_email: "x@example.com".to_string(),
            rating: 3.0,
            bonus_cents: 0,
            content: String::new(),
            avatars: vec![],
        };
        let review = req.into_review("r-9", t(5));
        assert_eq!(review.id, "r-9");
        assert_eq!(review.order_id, "o-1");
        assert_eq!(review.reviewed_at, t(5));
    }
}
