//! # Repository Module
//!
//! Database repository implementations for DriveShare.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ReservationStore for Database (store.rs)                              │
//! │       │                                                                 │
//! │       │  db.orders().list_by_car("C1")                                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert(&self, order)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_car / list_by_renter                                      │
//! │  └── replace(&self, order)                                             │
//! │       │                                                                 │
//! │       │  SQL Query → private *Row struct → domain type                  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Users by email
//! - [`CarTypeRepository`](car_type::CarTypeRepository) - Deduplicated car models
//! - [`CarRepository`](car::CarRepository) - Cars by car_no and owner
//! - [`OrderRepository`](order::OrderRepository) - Orders by car and renter
//! - [`ReviewRepository`](review::ReviewRepository) - One review per order

pub mod car;
pub mod car_type;
pub mod order;
pub mod review;
pub mod user;
