//! Permission cache configuration.
//!
//! Loaded from environment variables with defaults matching the back-office
//! deployment (5 minute TTL, 10 minute sweep).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time-to-live of a cached permission list.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval between background sweeps of expired entries.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Permission cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live of each entry, in seconds.
    pub ttl_secs: u64,

    /// Interval between background cleanup sweeps, in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOMEXPERT_PERMISSION_CACHE_TTL_SECS`: entry TTL (default: 300)
    /// - `HOMEXPERT_PERMISSION_CACHE_CLEANUP_SECS`: sweep interval (default: 600)
    ///
    /// Zero or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            ttl_secs: env_secs("HOMEXPERT_PERMISSION_CACHE_TTL_SECS").unwrap_or(default.ttl_secs),
            cleanup_interval_secs: env_secs("HOMEXPERT_PERMISSION_CACHE_CLEANUP_SECS")
                .unwrap_or(default.cleanup_interval_secs),
        }
    }

    /// Entry TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Cleanup interval as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
}
