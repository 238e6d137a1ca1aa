//! # Rating Aggregation
//!
//! Mean ratings per car and per owner.
//!
//! A tally keeps the raw sum and count so that an owner's overall rating is
//! `Σ ratings / Σ reviewed trips` across all their cars, not a mean of means.
//! With zero reviews the mean is `0.0`.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Order, ReviewIndex};

/// Running sum and count of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RatingTally {
    /// Number of reviewed trips.
    pub trips: u32,
    /// Sum of their ratings.
    pub total: f64,
}

impl RatingTally {
    pub fn record(&mut self, rating: f64) {
        self.trips += 1;
        self.total += rating;
    }

    /// Safe mean: zero reviews yield 0.0.
    pub fn mean(&self) -> f64 {
        if self.trips == 0 {
            0.0
        } else {
            self.total / f64::from(self.trips)
        }
    }
}

impl Add for RatingTally {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        RatingTally {
            trips: self.trips + other.trips,
            total: self.total + other.total,
        }
    }
}

impl Sum for RatingTally {
    fn sum<I: Iterator<Item = RatingTally>>(iter: I) -> Self {
        iter.fold(RatingTally::default(), Add::add)
    }
}

/// Tallies the reviews attached to `orders` (normally every order of one car).
///
/// Orders without a review are skipped.
pub fn tally_orders<'o, I>(orders: I, reviews: &ReviewIndex) -> RatingTally
where
    I: IntoIterator<Item = &'o Order>,
{
    let mut tally = RatingTally::default();
    for order in orders {
        if let Some(review) = reviews.get(&order.id) {
            tally.record(review.rating);
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PayMethod, Review};
    use chrono::Utc;

    fn order(id: &str, car_no: &str) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            renter_email: "x@example.com".to_string(),
            car_no: car_no.to_string(),
            from_time: now,
            to_time: now,
            status: OrderStatus::Completed,
            pay_method: PayMethod::CreditCard,
            created_at: now,
        }
    }

    fn review(order_id: &str, rating: f64) -> Review {
        Review {
            id: format!("r-{order_id}"),
            order_id: order_id.to_string(),
            rating,
            bonus_cents: 0,
            content: String::new(),
            avatars: vec![],
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_mean_is_zero() {
        let tally = RatingTally::default();
        assert_eq!(tally.trips, 0);
        assert_eq!(tally.mean(), 0.0);
        assert!(!tally.mean().is_nan());
    }

    #[test]
    fn test_car_tally_skips_unreviewed_orders() {
        let orders = vec![order("o1", "C1"), order("o2", "C1"), order("o3", "C1")];
        let reviews: ReviewIndex = vec![review("o1", 5.0), review("o3", 3.0)].into_iter().collect();

        let tally = tally_orders(&orders, &reviews);
        assert_eq!(tally.trips, 2);
        assert!((tally.mean() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_owner_rating_weights_by_trips() {
        // C1: one 5-star trip. C2: three 2-star trips.
        let c1 = RatingTally { trips: 1, total: 5.0 };
        let c2 = RatingTally { trips: 3, total: 6.0 };

        let owner: RatingTally = vec![c1, c2].into_iter().sum();
        assert_eq!(owner.trips, 4);
        // (5 + 6) / 4, not (5.0 + 2.0) / 2
        assert!((owner.mean() - 2.75).abs() < 1e-9);
    }

    #[test]
    fn test_owner_with_unreviewed_cars() {
        let owner: RatingTally = vec![RatingTally::default(), RatingTally::default()]
            .into_iter()
            .sum();
        assert_eq!(owner.mean(), 0.0);
    }
}
