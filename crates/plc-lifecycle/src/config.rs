//! # Configuration
//!
//! | Variable                  | Default               |
//! |---------------------------|-----------------------|
//! | `PLC_DASHBOARD_CACHE_KEY` | `analytics_dashboard` |
//! | `PLC_AUDIT_CAPACITY`      | `10000`               |
//! | `PLC_SLOW_LISTENER_MS`    | `250`                 |
//!
//! Unparseable values fall back to the default with a warning.

use std::str::FromStr;
use std::time::Duration;

use plc_events::{DEFAULT_AUDIT_CAPACITY, DEFAULT_SLOW_LISTENER_THRESHOLD};

/// Cache key under which the dashboard rollup is stored.
pub const DEFAULT_DASHBOARD_CACHE_KEY: &str = "analytics_dashboard";

/// Lifecycle stack configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Key invalidated after every successful transition or creation.
    pub dashboard_cache_key: String,
    /// Maximum retained audit entries.
    pub audit_capacity: usize,
    /// Listeners slower than this are reported.
    pub slow_listener_threshold: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            dashboard_cache_key: DEFAULT_DASHBOARD_CACHE_KEY.to_string(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            slow_listener_threshold: DEFAULT_SLOW_LISTENER_THRESHOLD,
        }
    }
}

impl LifecycleConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let dashboard_cache_key = lookup("PLC_DASHBOARD_CACHE_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or(defaults.dashboard_cache_key);

        let audit_capacity =
            parse_or("PLC_AUDIT_CAPACITY", &lookup, defaults.audit_capacity).max(1);

        let slow_listener_threshold = Duration::from_millis(parse_or(
            "PLC_SLOW_LISTENER_MS",
            &lookup,
            defaults.slow_listener_threshold.as_millis() as u64,
        ));

        Self {
            dashboard_cache_key,
            audit_capacity,
            slow_listener_threshold,
        }
    }
}

fn parse_or<T>(var: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(var, value = %raw, error = %e, "invalid value, using default");
                default
            }
        },
    }
}
