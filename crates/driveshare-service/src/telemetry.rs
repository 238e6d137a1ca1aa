//! # Logging Setup
//!
//! ## Log Targets
//! ```text
//! driveshare_service        info!  lifecycle transitions, warn!/error! on failures
//! driveshare_db             debug! per repository call
//! driveshare::security      warn!  identity mismatches, duplicate reviews
//! sqlx                      warn!  only (query logging is noisy)
//! ```
//!
//! `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=driveshare::security=warn,driveshare_service=info`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,driveshare=debug,sqlx=warn";

/// Filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global fmt subscriber.
///
/// Fails if a global subscriber is already set, so call it once at startup.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
