//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use driveshare_core::{BoundaryPolicy, EarnedTodayRule, DEFAULT_BOUNDARY_POLICY};

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reservation service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Deadline for one operation, covering every store call it makes
    pub request_timeout: Duration,

    /// Which reviews count towards an owner's "earned today"
    pub earned_today_rule: EarnedTodayRule,

    /// Whether touching booking windows conflict
    pub boundary_policy: BoundaryPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            earned_today_rule: EarnedTodayRule::default(),
            boundary_policy: DEFAULT_BOUNDARY_POLICY,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                           | Default                |
    /// |------------------------------------|------------------------|
    /// | `DRIVESHARE_REQUEST_TIMEOUT_SECS`  | `10`                   |
    /// | `DRIVESHARE_EARNED_TODAY_RULE`     | `rolling_and_same_day` |
    /// | `DRIVESHARE_BOUNDARY_POLICY`       | `half_open`            |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let request_timeout = match lookup("DRIVESHARE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("DRIVESHARE_REQUEST_TIMEOUT_SECS".to_string())
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "DRIVESHARE_REQUEST_TIMEOUT_SECS".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let earned_today_rule = match lookup("DRIVESHARE_EARNED_TODAY_RULE") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("DRIVESHARE_EARNED_TODAY_RULE".to_string())
            })?,
            None => defaults.earned_today_rule,
        };

        let boundary_policy = match lookup("DRIVESHARE_BOUNDARY_POLICY") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("DRIVESHARE_BOUNDARY_POLICY".to_string())
            })?,
            None => defaults.boundary_policy,
        };

        Ok(ServiceConfig {
            request_timeout,
            earned_today_rule,
            boundary_policy,
        })
    }

    /// Sets the per-request deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the earned-today rule.
    pub fn earned_today_rule(mut self, rule: EarnedTodayRule) -> Self {
        self.earned_today_rule = rule;
        self
    }

    /// Sets the interval boundary policy.
    pub fn boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.boundary_policy, BoundaryPolicy::HalfOpen);
        assert_eq!(config.earned_today_rule, EarnedTodayRule::RollingAndSameDay);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("DRIVESHARE_REQUEST_TIMEOUT_SECS", "3"),
            ("DRIVESHARE_EARNED_TODAY_RULE", "calendar_day"),
            ("DRIVESHARE_BOUNDARY_POLICY", "closed"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.earned_today_rule, EarnedTodayRule::CalendarDay);
        assert_eq!(config.boundary_policy, BoundaryPolicy::Closed);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("DRIVESHARE_REQUEST_TIMEOUT_SECS", "soon"),
            ("DRIVESHARE_REQUEST_TIMEOUT_SECS", "0"),
            ("DRIVESHARE_EARNED_TODAY_RULE", "yesterday"),
            ("DRIVESHARE_BOUNDARY_POLICY", "open"),
        ] {
            let err = ServiceConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}");
        }
    }

    #[test]
    fn test_builder() {
        let config = ServiceConfig::default()
            .request_timeout(Duration::from_millis(250))
            .boundary_policy(BoundaryPolicy::Closed);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.boundary_policy, BoundaryPolicy::Closed);
    }
}
