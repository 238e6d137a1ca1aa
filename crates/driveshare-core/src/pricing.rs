//! # Pricing & Revenue
//!
//! Rental cost, trip totals and the owner's "earned today" figure.
//!
//! ## Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  billable_days = ceil((to - from) / 24h)     any started day counts     │
//! │  cost          = billable_days × car.daily_price                        │
//! │  bonus         = review.bonus  (0 when the order has no review)         │
//! │  total         = cost + bonus                                           │
//! │                                                                         │
//! │  earned_today  = Σ total over reviewed orders whose review falls       │
//! │                  inside the configured "today" rule                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bonus is taken from the review whenever one exists, whatever the stored
//! order status. A review whose status write failed still pays out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Car, Order, OrderStatus, Review};

// =============================================================================
// Cost
// =============================================================================

/// Number of started 24-hour days in `[from, to)`.
///
/// Returns 0 for an empty or inverted window.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use driveshare_core::pricing::billable_days;
///
/// let from = Utc::now();
/// assert_eq!(billable_days(from, from + Duration::hours(24)), 1);
/// assert_eq!(billable_days(from, from + Duration::hours(25)), 2);
/// assert_eq!(billable_days(from, from + Duration::seconds(1)), 1);
/// ```
pub fn billable_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let span = to - from;
    if span <= Duration::zero() {
        return 0;
    }

    let whole_days = span.num_days();
    if span > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    }
}

/// Rental cost of an order before any bonus.
pub fn order_cost(order: &Order, daily_price: Money) -> Money {
    daily_price.times(billable_days(order.from_time, order.to_time))
}

/// Bonus attached to the order's review, if any.
pub fn order_bonus(review: Option<&Review>) -> Money {
    review.map(Review::bonus).unwrap_or_default()
}

/// Cost plus bonus.
pub fn order_total(order: &Order, daily_price: Money, review: Option<&Review>) -> Money {
    order_cost(order, daily_price) + order_bonus(review)
}

// =============================================================================
// Earned Today
// =============================================================================

/// Which reviewed orders count toward "earned today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarnedTodayRule {
    /// Within 24 hours of `now` AND the same UTC day-of-month.
    #[default]
    RollingAndSameDay,
    /// Within 24 hours of `now`.
    RollingWindow,
    /// Same UTC calendar date as `now`.
    CalendarDay,
}

impl EarnedTodayRule {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EarnedTodayRule::RollingAndSameDay => "rolling_and_same_day",
            EarnedTodayRule::RollingWindow => "rolling_window",
            EarnedTodayRule::CalendarDay => "calendar_day",
        }
    }

    /// True if a review made at `reviewed_at` counts as earned at `now`.
    pub fn counts(&self, reviewed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let within_a_day = (now - reviewed_at).abs() <= Duration::hours(24);
        match self {
            EarnedTodayRule::RollingAndSameDay => within_a_day && reviewed_at.day() == now.day(),
            EarnedTodayRule::RollingWindow => within_a_day,
            EarnedTodayRule::CalendarDay => reviewed_at.date_naive() == now.date_naive(),
        }
    }
}

impl fmt::Display for EarnedTodayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EarnedTodayRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        [
            EarnedTodayRule::RollingAndSameDay,
            EarnedTodayRule::RollingWindow,
            EarnedTodayRule::CalendarDay,
        ]
        .into_iter()
        .find(|rule| rule.as_str() == wanted)
        .ok_or_else(|| ValidationError::NotAllowed {
            field: "earned_today_rule".to_string(),
            allowed: vec![
                "rolling_and_same_day".to_string(),
                "rolling_window".to_string(),
                "calendar_day".to_string(),
            ],
        })
    }
}

// =============================================================================
// Revenue Lines
// =============================================================================

/// One order on the owner's revenue report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueLine {
    pub order_id: String,
    pub car_no: String,
    pub renter_email: String,
    /// Renter's username, empty if the account is gone.
    pub renter_username: String,
    pub status: OrderStatus,
    pub cost: Money,
    pub bonus: Money,
    pub total: Money,
    #[ts(as = "Option<String>")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Prices a single order of `car`.
pub fn revenue_line(
    car: &Car,
    order: &Order,
    review: Option<&Review>,
    renter_username: impl Into<String>,
) -> RevenueLine {
    let cost = order_cost(order, car.daily_price());
    let bonus = order_bonus(review);
    RevenueLine {
        order_id: order.id.clone(),
        car_no: order.car_no.clone(),
        renter_email: order.renter_email.clone(),
        renter_username: renter_username.into(),
        status: order.status,
        cost,
        bonus,
        total: cost + bonus,
        reviewed_at: review.map(|r| r.reviewed_at),
    }
}

/// Sums the totals of lines whose review counts under `rule`.
pub fn earned_today(lines: &[RevenueLine], rule: EarnedTodayRule, now: DateTime<Utc>) -> Money {
    lines
        .iter()
        .filter(|line| line.reviewed_at.is_some_and(|at| rule.counts(at, now)))
        .map(|line| line.total)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PayMethod;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn car(daily_cents: i64) -> Car {
        Car {
            car_no: "C1".to_string(),
            owner_email: "owner@example.com".to_string(),
            car_type_id: "t-1".to_string(),
            daily_price_cents: daily_cents,
            avatar: String::new(),
            from_where: String::new(),
            to_where: String::new(),
            created_at: at(1, 0),
        }
    }

    fn order(id: &str, from: DateTime<Utc>, to: DateTime<Utc>, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            renter_email: "x@example.com".to_string(),
            car_no: "C1".to_string(),
            from_time: from,
            to_time: to,
            status,
            pay_method: PayMethod::CreditCard,
            created_at: from,
        }
    }

    fn review(order_id: &str, bonus_cents: i64, reviewed_at: DateTime<Utc>) -> Review {
        Review {
            id: format!("r-{order_id}"),
            order_id: order_id.to_string(),
            rating: 4.0,
            bonus_cents,
            content: String::new(),
            avatars: vec![],
            reviewed_at,
        }
    }

    #[test]
    fn test_billable_days_rounds_up() {
        let from = at(1, 0);
        assert_eq!(billable_days(from, from + Duration::hours(24)), 1);
        assert_eq!(billable_days(from, from + Duration::hours(25)), 2);
        assert_eq!(billable_days(from, from + Duration::hours(48)), 2);
        assert_eq!(billable_days(from, from + Duration::nanoseconds(1)), 1);
        assert_eq!(billable_days(from, from + Duration::days(48) + Duration::nanoseconds(1)), 49);
    }

    #[test]
    fn test_billable_days_empty_window() {
        let from = at(1, 0);
        assert_eq!(billable_days(from, from), 0);
        assert_eq!(billable_days(from, from - Duration::hours(3)), 0);
    }

    #[test]
    fn test_total_is_cost_plus_bonus() {
        let c = car(1000);
        let o = order("o-1", at(1, 0), at(2, 1), OrderStatus::Completed);
        let r = review("o-1", 250, at(2, 2));

        assert_eq!(order_cost(&o, c.daily_price()).cents(), 2000);
        assert_eq!(order_total(&o, c.daily_price(), Some(&r)).cents(), 2250);
        assert_eq!(order_total(&o, c.daily_price(), None).cents(), 2000);
    }

    #[test]
    fn test_bonus_counts_even_when_status_write_failed() {
        let c = car(1000);
        let o = order("o-1", at(1, 0), at(2, 0), OrderStatus::Pending);
        let r = review("o-1", 500, at(2, 1));

        let line = revenue_line(&c, &o, Some(&r), "xavier");
        assert_eq!(line.status, OrderStatus::Pending);
        assert_eq!(line.bonus.cents(), 500);
        assert_eq!(line.total.cents(), 1500);
    }

    #[test]
    fn test_rolling_and_same_day() {
        let rule = EarnedTodayRule::RollingAndSameDay;
        let now = at(10, 1);

        assert!(rule.counts(at(10, 0), now));
        // 23h earlier but yesterday's date
        assert!(!rule.counts(at(9, 2), now));
        // same day, later than now
        assert!(rule.counts(at(10, 23), now));
        assert!(!rule.counts(at(8, 1), now));
    }

    #[test]
    fn test_rolling_window_and_calendar_day() {
        let now = at(10, 1);

        assert!(EarnedTodayRule::RollingWindow.counts(at(9, 2), now));
        assert!(EarnedTodayRule::RollingWindow.counts(at(9, 1), now));
        assert!(!EarnedTodayRule::RollingWindow.counts(at(9, 0), now));

        assert!(EarnedTodayRule::CalendarDay.counts(at(10, 23), now));
        assert!(!EarnedTodayRule::CalendarDay.counts(at(9, 23), now));
    }

    /// Day-of-month alone would match a review from one month earlier.
    #[test]
    fn test_same_day_of_previous_month_does_not_count() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let month_ago = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert!(!EarnedTodayRule::RollingAndSameDay.counts(month_ago, now));
    }

    #[test]
    fn test_earned_today_sums_qualifying_totals() {
        let c = car(1000);
        let now = at(10, 12);
        let today = order("o-1", at(8, 0), at(10, 0), OrderStatus::Completed);
        let last_week = order("o-2", at(1, 0), at(2, 0), OrderStatus::Completed);
        let unreviewed = order("o-3", at(9, 0), at(10, 0), OrderStatus::Pending);

        let lines = vec![
            revenue_line(&c, &today, Some(&review("o-1", 300, at(10, 9))), ""),
            revenue_line(&c, &last_week, Some(&review("o-2", 100, at(3, 9))), ""),
            revenue_line(&c, &unreviewed, None, ""),
        ];

        assert_eq!(earned_today(&lines, EarnedTodayRule::default(), now).cents(), 2300);
        assert_eq!(earned_today(&[], EarnedTodayRule::default(), now), Money::zero());
    }

    #[test]
    fn test_rule_parse() {
        assert_eq!(
            "calendar_day".parse::<EarnedTodayRule>().unwrap(),
            EarnedTodayRule::CalendarDay
        );
        assert!("yesterday".parse::<EarnedTodayRule>().is_err());
        assert_eq!(EarnedTodayRule::default().to_string(), "rolling_and_same_day");
    }
}
