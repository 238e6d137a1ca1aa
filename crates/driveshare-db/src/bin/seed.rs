//! # Seed Data Generator
//!
//! Populates the database with demo owners, renters, cars and bookings for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed ./driveshare_dev.db with 3 owners (default)
//! cargo run -p driveshare-db --bin seed
//!
//! # More owners, each with a fleet of 4 cars
//! cargo run -p driveshare-db --bin seed -- --owners 10
//!
//! # Specify database path
//! cargo run -p driveshare-db --bin seed -- --db ./data/driveshare.db
//! ```
//!
//! ## Generated Data
//! - Owners `owner{N}@driveshare.dev`, each with 4 cars
//! - Renters `renter{N}@driveshare.dev`
//! - Per car: one past order (completed and reviewed), one upcoming
//!   pending order, and one cancelled order
//!
//! Plates look like `DS{owner:02}-{car:03}`.

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use driveshare_core::{
    Car, CarType, CarTypeSpec, LoginMethod, Order, OrderStatus, PayMethod, Review, User,
};
use driveshare_db::{Database, DbConfig};

/// (brand, model, seats, gearbox, fuel, daily price in cents)
const MODELS: &[(&str, &str, i64, &str, &str, i64)] = &[
    ("Toyota", "Vios", 5, "automatic", "petrol", 4_500),
    ("Honda", "City", 5, "automatic", "petrol", 5_000),
    ("Mitsubishi", "Xpander", 7, "manual", "petrol", 6_500),
    ("Ford", "Ranger", 5, "manual", "diesel", 8_000),
    ("VinFast", "VF8", 5, "automatic", "electric", 11_000),
];

const FIRST_NAMES: &[&str] = &["An", "Binh", "Chi", "Dung", "Giang", "Hoa", "Khanh", "Linh"];

const LOCATIONS: &[&str] = &["Airport", "Central Station", "Old Quarter", "West Lake", "Harbour"];

const CARS_PER_OWNER: usize = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut owners: usize = 3;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--owners" | "-o" => {
                if i + 1 < args.len() {
                    owners = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("DriveShare Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --owners <N>   Number of owners to generate (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: $DRIVESHARE_DB_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = match db_path {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_env(),
    };

    info!(path = %config.database_path.display(), owners, "Seeding database");

    let db = Database::new(config).await?;

    let existing = db.cars().count().await?;
    if existing > 0 {
        warn!(
            cars = existing,
            "Database already has cars, skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();

    let car_types = seed_car_types(&db).await?;
    let renters = seed_users(&db, "renter", owners.max(1) * 2).await?;
    let owner_users = seed_users(&db, "owner", owners).await?;

    let mut cars = 0;
    let mut orders = 0;

    for (owner_idx, owner) in owner_users.iter().enumerate() {
        for car_idx in 0..CARS_PER_OWNER {
            let seed = owner_idx * CARS_PER_OWNER + car_idx;
            let (car_type, daily_price_cents) = &car_types[seed % car_types.len()];

            let car = generate_car(owner, car_type, *daily_price_cents, owner_idx, car_idx);
            db.cars().insert(&car).await?;
            cars += 1;

            let renter = &renters[seed % renters.len()];
            orders += seed_orders(&db, &car, renter, seed).await?;
        }
    }

    info!(
        users = db.users().count().await?,
        cars,
        orders,
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    Ok(())
}

async fn seed_car_types(db: &Database) -> Result<Vec<(CarType, i64)>, Box<dyn std::error::Error>> {
    let mut types = Vec::with_capacity(MODELS.len());
    for (brand, model, seats, gearbox, fuel, price) in MODELS {
        let spec = CarTypeSpec {
            brand: brand.to_string(),
            model: model.to_string(),
            seats: *seats,
            gearbox: gearbox.to_string(),
            fuel: fuel.to_string(),
        };
        let car_type = CarType::from_spec(Uuid::new_v4().to_string(), spec);
        db.car_types().insert(&car_type).await?;
        types.push((car_type, *price));
    }
    Ok(types)
}

async fn seed_users(
    db: &Database,
    role: &str,
    count: usize,
) -> Result<Vec<User>, Box<dyn std::error::Error>> {
    let mut users = Vec::with_capacity(count);
    for n in 1..=count {
        let first_name = FIRST_NAMES[n % FIRST_NAMES.len()];
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: format!("{role}{n}@driveshare.dev"),
            first_name: first_name.to_string(),
            last_name: "Nguyen".to_string(),
            username: format!("{}{n}", first_name.to_lowercase()),
            avatar: format!("https://avatars.driveshare.dev/{role}{n}.png"),
            login_method: LoginMethod::ALL[n % LoginMethod::ALL.len()],
            credentials: String::new(),
            created_at: Utc::now() - Duration::days(90),
        };
        db.users().insert(&user).await?;
        users.push(user);
    }
    Ok(users)
}

fn generate_car(
    owner: &User,
    car_type: &CarType,
    daily_price_cents: i64,
    owner_idx: usize,
    car_idx: usize,
) -> Car {
    let seed = owner_idx + car_idx;
    Car {
        car_no: format!("DS{:02}-{:03}", owner_idx + 1, car_idx + 1),
        owner_email: owner.email.clone(),
        car_type_id: car_type.id.clone(),
        daily_price_cents,
        avatar: format!(
            "https://cars.driveshare.dev/{}.png",
            car_type.model.to_lowercase()
        ),
        from_where: LOCATIONS[seed % LOCATIONS.len()].to_string(),
        to_where: LOCATIONS[(seed + 1) % LOCATIONS.len()].to_string(),
        created_at: Utc::now() - Duration::days(60),
    }
}

/// Past completed + reviewed, upcoming pending, and one cancelled order.
async fn seed_orders(
    db: &Database,
    car: &Car,
    renter: &User,
    seed: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let days = (seed % 3) as i64 + 1;
    let pay_method = PayMethod::ALL[seed % PayMethod::ALL.len()];

    let order = |from_offset: i64, status: OrderStatus| Order {
        id: Uuid::new_v4().to_string(),
        renter_email: renter.email.clone(),
        car_no: car.car_no.clone(),
        from_time: now + Duration::days(from_offset),
        to_time: now + Duration::days(from_offset + days),
        status,
        pay_method,
        created_at: now + Duration::days(from_offset.min(0) - 1),
    };

    let past = order(-10 - seed as i64, OrderStatus::Completed);
    let upcoming = order(5 + seed as i64, OrderStatus::Pending);
    let cancelled = order(20 + seed as i64, OrderStatus::Cancelled);

    for o in [&past, &upcoming, &cancelled] {
        db.orders().insert(o).await?;
    }

    let review = Review {
        id: Uuid::new_v4().to_string(),
        order_id: past.id.clone(),
        rating: 3.0 + (seed % 5) as f64 * 0.5,
        bonus_cents: (seed % 4) as i64 * 500,
        content: format!("Clean {} and an easy pickup.", car.car_no),
        avatars: Vec::new(),
        reviewed_at: past.to_time,
    };
    db.reviews().insert(&review).await?;

    Ok(3)
}
