//! # driveshare-db: SQLite Store for DriveShare
//!
//! This crate provides database access for the DriveShare reservation
//! backend. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        DriveShare Data Flow                             │
//! │                                                                         │
//! │  ReservationService::create_order                                      │
//! │       │                                                                 │
//! │       ▼  S: ReservationStore                                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   driveshare-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CarRepo       │    │ 001_initial  │  │   │
//! │  │   │ store.rs impl │    │ OrderRepo ... │    │ _schema.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file ($DRIVESHARE_DB_PATH, default ./driveshare.db)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per collection
//! - [`store`] - `ReservationStore` implementation for [`Database`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use driveshare_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! let orders = db.orders().list_by_car("29A-12345").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::car::CarRepository;
pub use repository::car_type::CarTypeRepository;
pub use repository::order::OrderRepository;
pub use repository::review::ReviewRepository;
pub use repository::user::UserRepository;
