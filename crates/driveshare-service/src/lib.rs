//! # driveshare-service: Reservation Operations
//!
//! The caller-facing layer of DriveShare. HTTP routing, sessions and
//! password hashing live outside; whatever sits in front calls these
//! methods with already-authenticated emails.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   caller (HTTP handler, CLI, test)                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │            driveshare-service (THIS CRATE)                      │  │
//! │   │                                                                 │  │
//! │   │   ReservationService<S, C>   ServiceConfig    init_tracing      │  │
//! │   │   (service.rs)               (config.rs)      (telemetry.rs)    │  │
//! │   │        │                                                        │  │
//! │   │        ├── Clock: SystemClock / FixedClock (clock.rs)           │  │
//! │   │        └── S: ReservationStore                                  │  │
//! │   └────────────────┬───────────────────────────┬────────────────────┘  │
//! │                    ▼                           ▼                       │
//! │        driveshare_db::Database        InMemoryStore (memory.rs)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use driveshare_db::{Database, DbConfig};
//! use driveshare_service::{telemetry, ReservationService, ServiceConfig};
//!
//! telemetry::init_tracing()?;
//! let db = Database::new(DbConfig::from_env()).await?;
//! let service = ReservationService::new(db, ServiceConfig::load()?);
//! let report = service.list_revenue("owner@example.com").await?;
//! ```

pub mod clock;
pub mod config;
pub mod memory;
pub mod service;
pub mod telemetry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ServiceConfig, DEFAULT_REQUEST_TIMEOUT};
pub use memory::InMemoryStore;
pub use service::{ReservationService, SubmittedReview, SECURITY_TARGET};
