//! # HomeXpert Access
//!
//! Permission resolution and caching for the HomeXpert admin back-office.
//!
//! ## Overview
//!
//! The homexpert-access crate handles:
//! - **Store**: The [`RoleStore`] abstraction over role and permission documents,
//!   with [`MemoryRoleStore`] for single-process apps and tests
//! - **Resolver**: Role id → permission list, failing closed
//! - **Cache**: Per-user TTL cache of resolved permissions with a background sweep
//! - **Access Control**: Cached checks and role edits that invalidate the cache
//!
//! ## Flow
//!
//! ```text
//! check(user, role, "vendors.view")
//!   ├─ cache.get(user) ── hit ──────────────┐
//!   └─ miss → resolver.resolve(role)        │
//!              ├─ store.find_role_by_id     │
//!              └─ store.find_permissions_by_ids
//!              → cache.set(user, perms) ────┤
//!                                           └─ has_permission(perms, "vendors.view")
//! ```
//!
//! ## Consistency
//!
//! Each process keeps its own cache. After a role edit made elsewhere,
//! a process may serve the old permissions for up to one TTL.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod store;

// Re-export main types
pub use cache::{CacheEntry, CleanupTask, PermissionCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_CACHE_TTL, DEFAULT_CLEANUP_INTERVAL};
pub use error::{AccessError, AccessResult};
pub use resolver::PermissionResolver;
pub use service::AccessControl;
pub use store::{MemoryRoleStore, RoleStore};
