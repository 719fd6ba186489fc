//! Permission cache
//!
//! This module provides a process-wide, TTL-bounded cache of resolved
//! permission lists keyed by user identifier, plus the background task that
//! sweeps expired entries.
//!
//! The cache is never the source of truth: it only holds derived copies and
//! can be wiped at any time at the cost of re-resolution.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use homexpert_access::{CacheConfig, PermissionCache};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let config = CacheConfig::from_env();
//!     let cache = Arc::new(PermissionCache::new(config));
//!
//!     // Start the sweep with the process, stop it on shutdown
//!     let cleanup = cache.spawn_cleanup(config.cleanup_interval());
//!
//!     cache.set("user-1", Vec::new()).await;
//!     assert!(cache.has("user-1").await);
//!
//!     cleanup.shutdown().await;
//! }
//! ```

use crate::clock::{duration_millis, Clock, SystemClock};
use crate::config::CacheConfig;
use homexpert_rbac::Permission;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A snapshot row of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// User identifier.
    pub key: String,
    /// Resolved permissions of the user's role.
    pub value: Vec<Permission>,
    /// Expiry, epoch milliseconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
struct Slot {
    permissions: Vec<Permission>,
    expires_at: i64,
}

impl Slot {
    fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// TTL cache of resolved permissions keyed by user id.
///
/// An entry inserted at `t` is visible to [`get`](Self::get) and
/// [`has`](Self::has) during `[t, t + ttl)` and never after.
pub struct PermissionCache {
    entries: RwLock<HashMap<String, Slot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl PermissionCache {
    /// Create a cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config.ttl(), Arc::new(SystemClock))
    }

    /// Create a cache with an explicit TTL and clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or replace a user's permissions, resetting the expiry window.
    ///
    /// Empty user ids are ignored.
    pub async fn set(&self, user_id: &str, permissions: Vec<Permission>) {
        if user_id.is_empty() {
            return;
        }

        let expires_at = self.clock.now_millis().saturating_add(duration_millis(self.ttl));
        self.entries.write().await.insert(
            user_id.to_string(),
            Slot {
                permissions,
                expires_at,
            },
        );
    }

    /// Get a user's permissions if cached and not expired.
    ///
    /// An expired entry is evicted.
    pub async fn get(&self, user_id: &str) -> Option<Vec<Permission>> {
        let now = self.clock.now_millis();

        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                None => return None,
                Some(slot) if slot.is_live(now) => return Some(slot.permissions.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check under the write lock, a concurrent set may have refreshed it
        match entries.get(user_id) {
            Some(slot) if slot.is_live(now) => Some(slot.permissions.clone()),
            Some(_) => {
                entries.remove(user_id);
                debug!(user_id = %user_id, "Evicted expired permission entry");
                None
            }
            None => None,
        }
    }

    /// Check for a live entry without mutating the cache.
    pub async fn has(&self, user_id: &str) -> bool {
        let now = self.clock.now_millis();
        self.entries
            .read()
            .await
            .get(user_id)
            .map(|slot| slot.is_live(now))
            .unwrap_or(false)
    }

    /// Remove one user's entry, or every entry when `user_id` is `None`.
    pub async fn clear(&self, user_id: Option<&str>) {
        let mut entries = self.entries.write().await;
        match user_id {
            Some(id) => {
                entries.remove(id);
            }
            None => {
                let count = entries.len();
                entries.clear();
                debug!(count, "Cleared permission cache");
            }
        }
    }

    /// Evict every expired entry.
    ///
    /// # Returns
    ///
    /// The number of entries evicted
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, slot| slot.is_live(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of all stored entries, sorted by key.
    pub async fn entries(&self) -> Vec<CacheEntry> {
        let entries = self.entries.read().await;
        let mut rows: Vec<CacheEntry> = entries
            .iter()
            .map(|(key, slot)| CacheEntry {
                key: key.clone(),
                value: slot.permissions.clone(),
                expires_at: slot.expires_at,
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    /// Start the periodic sweep of expired entries.
    ///
    /// The task holds only a weak reference and stops on its own once the
    /// cache is dropped. The first sweep runs one `interval` after start.
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> CleanupTask {
        let cache = Arc::downgrade(self);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(cleanup_loop(cache, interval, shutdown_rx));
        info!(interval_secs = interval.as_secs(), "Permission cache cleanup started");

        CleanupTask {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

async fn cleanup_loop(cache: Weak<PermissionCache>, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let evicted = cache.cleanup().await;
                if evicted > 0 {
                    debug!(evicted, "Swept expired permission entries");
                }
            }
        }
    }

    info!("Permission cache cleanup stopped");
}

/// Handle to the background cleanup task.
///
/// Dropping the handle aborts the task; [`shutdown`](Self::shutdown) stops
/// it gracefully.
#[derive(Debug)]
pub struct CleanupTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CleanupTask {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Check if the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for CleanupTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
