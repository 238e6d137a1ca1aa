//! The booking walkthrough against the SQLite store.

use chrono::{DateTime, TimeZone, Utc};

use driveshare_core::{
    CarTypeSpec, CoreError, ErrorKind, LoginMethod, Money, NewCar, NewUser, OrderRequest,
    OrderStatus, PayMethod, ReviewRequest,
};
use driveshare_db::{Database, DbConfig};
use driveshare_service::{FixedClock, ReservationService, ServiceConfig};

fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

fn user(email: &str, username: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: username.to_string(),
        last_name: "Pham".to_string(),
        username: username.to_string(),
        avatar: None,
        login_method: LoginMethod::Google,
        credentials: String::new(),
    }
}

fn booking(renter: &str, from: u32, to: u32) -> OrderRequest {
    OrderRequest {
        renter_email: renter.to_string(),
        car_no: "C1".to_string(),
        from_time: jan(from),
        to_time: jan(to),
        pay_method: PayMethod::CreditCard,
    }
}

async fn service() -> (ReservationService<Database, FixedClock>, FixedClock) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2023, 12, 30, 0, 0, 0).unwrap());
    let service = ReservationService::with_clock(db, clock.clone(), ServiceConfig::default());

    for (email, name) in [
        ("owner@example.com", "owner"),
        ("x@example.com", "xuan"),
        ("y@example.com", "yen"),
    ] {
        service.register_user(user(email, name)).await.unwrap();
    }

    service
        .register_car(
            "owner@example.com",
            NewCar {
                car_no: "C1".to_string(),
                spec: CarTypeSpec {
                    brand: "Honda".to_string(),
                    model: "City".to_string(),
                    seats: 5,
                    gearbox: "automatic".to_string(),
                    fuel: "petrol".to_string(),
                },
                daily_price_cents: 100,
                avatar: String::new(),
                from_where: "Airport".to_string(),
                to_where: "Station".to_string(),
            },
        )
        .await
        .unwrap();

    (service, clock)
}

#[tokio::test]
async fn test_booking_walkthrough() {
    let (service, clock) = service().await;

    // X holds C1 for [Jan1, Jan3)
    let held = service.create_order(booking("x@example.com", 1, 3)).await.unwrap();

    // Y overlapping is refused, Y touching is accepted
    let err = service
        .create_order(booking("y@example.com", 2, 4))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::OrderedByOthers { .. }));

    let next = service.create_order(booking("y@example.com", 3, 4)).await.unwrap();

    // Y can't cancel X's booking
    let err = service.cancel_order("y@example.com", &held.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SecurityViolation);

    // X reviews, order completes; a second review is refused
    clock.set(jan(3));
    let submitted = service
        .submit_review(ReviewRequest {
            order_id: held.id.clone(),
            renter_email: "x@example.com".to_string(),
            rating: 4.0,
            bonus_cents: 20,
            content: "Clean".to_string(),
            avatars: vec!["https://img/1.png".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(submitted.order.status, OrderStatus::Completed);

    let err = service
        .submit_review(ReviewRequest {
            order_id: held.id.clone(),
            renter_email: "x@example.com".to_string(),
            rating: 1.0,
            bonus_cents: 0,
            content: String::new(),
            avatars: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyReviewed(_)));

    let detail = service.get_order_detail(&held.id).await.unwrap();
    assert_eq!(detail.status, OrderStatus::Completed);
    assert_eq!(detail.cost, Money::from_cents(200));
    assert_eq!(detail.bonus, Money::from_cents(20));
    assert_eq!(detail.owner_rating, 4.0);

    // Y cancels their own booking; revenue drops it
    service.cancel_order("y@example.com", &next.id).await.unwrap();

    let report = service.list_revenue("owner@example.com").await.unwrap();
    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.earned_today, Money::from_cents(220));

    let cars = service.list_cars("owner@example.com").await.unwrap();
    assert_eq!(cars[0].rating, 4.0);
    assert_eq!(cars[0].trips, 1);

    let reviews = service.list_reviews("owner@example.com").await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].avatars, vec!["https://img/1.png".to_string()]);
}

#[tokio::test]
async fn test_duplicate_registration_through_sqlite() {
    let (service, _clock) = service().await;

    let err = service
        .register_user(user("x@example.com", "other"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
}
