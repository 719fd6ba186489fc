//! Access control service
//!
//! Ties the resolver and the cache together: permission lookups go through
//! the cache, and role edits invalidate it.

use crate::cache::PermissionCache;
use crate::error::AccessResult;
use crate::resolver::PermissionResolver;
use crate::store::RoleStore;
use homexpert_rbac::{has_permission, Permission, Role};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cached permission lookups and role administration.
///
/// # Example
///
/// ```rust,no_run
/// use homexpert_access::{AccessControl, CacheConfig, MemoryRoleStore, PermissionCache};
/// use std::sync::Arc;
///
/// async fn example() {
///     let store = Arc::new(MemoryRoleStore::new());
///     let cache = Arc::new(PermissionCache::new(CacheConfig::default()));
///     let access = AccessControl::new(store, cache);
///
///     let allowed = access.check("user-1", "role-1", "vendors.view").await;
///     assert!(!allowed);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AccessControl {
    resolver: PermissionResolver,
    cache: Arc<PermissionCache>,
}

impl AccessControl {
    /// Create a service over a store and a shared cache.
    pub fn new(store: Arc<dyn RoleStore>, cache: Arc<PermissionCache>) -> Self {
        Self {
            resolver: PermissionResolver::new(store),
            cache,
        }
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    /// The resolver.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    fn store(&self) -> &Arc<dyn RoleStore> {
        self.resolver.store()
    }

    /// Permissions of a user holding `role_id`.
    ///
    /// Served from the cache when possible; on a miss the role is resolved
    /// and the result cached under `user_id`. Store failures yield an empty
    /// list and are not cached, so the next request retries.
    pub async fn permissions_for(&self, user_id: &str, role_id: &str) -> Vec<Permission> {
        if let Some(permissions) = self.cache.get(user_id).await {
            return permissions;
        }

        match self.resolver.try_resolve(role_id).await {
            Ok(permissions) => {
                self.cache.set(user_id, permissions.clone()).await;
                permissions
            }
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    role_id = %role_id,
                    error = %e,
                    "Permission resolution failed, denying"
                );
                Vec::new()
            }
        }
    }

    /// Check a user's access to a `module.action` / `module.resource` capability.
    pub async fn check(&self, user_id: &str, role_id: &str, requested: &str) -> bool {
        let permissions = self.permissions_for(user_id, role_id).await;
        let allowed = has_permission(&permissions, requested);
        debug!(user_id = %user_id, requested = %requested, allowed, "Access decision");
        allowed
    }

    /// Drop one user's cached permissions (e.g. after their role changed).
    pub async fn invalidate_user(&self, user_id: &str) {
        self.cache.clear(Some(user_id)).await;
    }

    /// Drop every cached permission list.
    pub async fn invalidate_all(&self) {
        self.cache.clear(None).await;
    }

    /// Replace a role's permission references.
    ///
    /// The cache is keyed by user, so any role edit wipes it entirely.
    pub async fn set_role_permissions(&self, role_id: &str, permission_ids: Vec<String>) -> AccessResult<Role> {
        let role = self.store().set_role_permissions(role_id, permission_ids).await?;
        self.cache.clear(None).await;
        info!(role_id = %role_id, count = role.permissions.len(), "Role permissions updated");
        Ok(role)
    }

    /// Add one permission reference to a role.
    ///
    /// The edit is a single store update, so concurrent grants on the same
    /// role do not overwrite each other.
    pub async fn grant(&self, role_id: &str, permission_id: &str) -> AccessResult<Role> {
        let role = self.store().add_role_permission(role_id, permission_id).await?;
        self.cache.clear(None).await;
        info!(role_id = %role_id, permission_id = %permission_id, "Permission granted");
        Ok(role)
    }

    /// Remove one permission reference from a role.
    pub async fn revoke(&self, role_id: &str, permission_id: &str) -> AccessResult<Role> {
        let role = self.store().remove_role_permission(role_id, permission_id).await?;
        self.cache.clear(None).await;
        info!(role_id = %role_id, permission_id = %permission_id, "Permission revoked");
        Ok(role)
    }

    /// Delete a role. System roles are rejected.
    pub async fn delete_role(&self, role_id: &str) -> AccessResult<()> {
        self.store().delete_role(role_id).await?;
        self.cache.clear(None).await;
        info!(role_id = %role_id, "Role deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::AccessError;
    use crate::store::MemoryRoleStore;
    use async_trait::async_trait;
    use homexpert_rbac::{Action, PermissionRecord};
    use std::time::Duration;

    /// Store that suspends before every call, like one backed by a network.
    struct YieldingStore {
        inner: MemoryRoleStore,
    }

    #[async_trait]
    impl RoleStore for YieldingStore {
        async fn find_role_by_id(&self, id: &str) -> AccessResult<Option<Role>> {
            tokio::task::yield_now().await;
            self.inner.find_role_by_id(id).await
        }

        async fn find_role_by_name(&self, name: &str) -> AccessResult<Option<Role>> {
            tokio::task::yield_now().await;
            self.inner.find_role_by_name(name).await
        }

        async fn find_permissions_by_ids(&self, ids: &[String]) -> AccessResult<Vec<PermissionRecord>> {
            tokio::task::yield_now().await;
            self.inner.find_permissions_by_ids(ids).await
        }

        async fn list_roles(&self) -> AccessResult<Vec<Role>> {
            tokio::task::yield_now().await;
            self.inner.list_roles().await
        }

        async fn insert_role(&self, role: Role) -> AccessResult<Role> {
            tokio::task::yield_now().await;
            self.inner.insert_role(role).await
        }

        async fn insert_permission(&self, record: PermissionRecord) -> AccessResult<PermissionRecord> {
            tokio::task::yield_now().await;
            self.inner.insert_permission(record).await
        }

        async fn set_role_permissions(&self, role_id: &str, ids: Vec<String>) -> AccessResult<Role> {
            tokio::task::yield_now().await;
            self.inner.set_role_permissions(role_id, ids).await
        }

        async fn add_role_permission(&self, role_id: &str, id: &str) -> AccessResult<Role> {
            tokio::task::yield_now().await;
            self.inner.add_role_permission(role_id, id).await
        }

        async fn remove_role_permission(&self, role_id: &str, id: &str) -> AccessResult<Role> {
            tokio::task::yield_now().await;
            self.inner.remove_role_permission(role_id, id).await
        }

        async fn delete_role(&self, role_id: &str) -> AccessResult<()> {
            tokio::task::yield_now().await;
            self.inner.delete_role(role_id).await
        }
    }

    async fn setup() -> (Arc<MemoryRoleStore>, Arc<ManualClock>, AccessControl) {
        let store = Arc::new(MemoryRoleStore::new());
        store
            .insert_permission(PermissionRecord::new(
                "p-view",
                Permission::new("vendors", Action::View, "vendors"),
            ))
            .await
            .unwrap();
        store
            .insert_permission(PermissionRecord::new(
                "p-delete",
                Permission::new("vendors", Action::Delete, "vendors"),
            ))
            .await
            .unwrap();
        store
            .insert_permission(PermissionRecord::new("p-all", Permission::wildcard("system")))
            .await
            .unwrap();
        store
            .insert_role(Role::new("r-admin", "Admin").with_permissions(["p-all"]).system())
            .await
            .unwrap();
        store
            .insert_role(Role::new("r-help", "Helpline").with_permissions(["p-view"]))
            .await
            .unwrap();

        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(PermissionCache::with_clock(Duration::from_secs(300), clock.clone()));
        let access = AccessControl::new(store.clone(), cache);
        (store, clock, access)
    }

    #[tokio::test]
    async fn test_check_resolves_and_caches() {
        let (_, _, access) = setup().await;

        assert!(access.check("u1", "r-help", "vendors.view").await);
        assert!(!access.check("u1", "r-help", "vendors.delete").await);
        assert!(access.cache().has("u1").await);
    }

    #[tokio::test]
    async fn test_wildcard_role() {
        let (_, _, access) = setup().await;
        assert!(access.check("u-admin", "r-admin", "leads.delete").await);
        assert!(access.check("u-admin", "r-admin", "subscriptions.create").await);
    }

    #[tokio::test]
    async fn test_cached_value_served_until_expiry() {
        let (store, clock, access) = setup().await;
        assert!(!access.check("u1", "r-help", "vendors.delete").await);

        // Edit behind the service's back: cache stays stale until TTL
        store
            .set_role_permissions("r-help", vec!["p-view".into(), "p-delete".into()])
            .await
            .unwrap();
        assert!(!access.check("u1", "r-help", "vendors.delete").await);

        clock.advance(Duration::from_secs(300));
        assert!(access.check("u1", "r-help", "vendors.delete").await);
    }

    #[tokio::test]
    async fn test_role_edit_through_service_invalidates() {
        let (_, _, access) = setup().await;
        assert!(!access.check("u1", "r-help", "vendors.delete").await);

        let role = access.grant("r-help", "p-delete").await.unwrap();
        assert_eq!(role.permissions, vec!["p-view", "p-delete"]);
        assert!(access.cache().is_empty().await);
        assert!(access.check("u1", "r-help", "vendors.delete").await);

        access.revoke("r-help", "p-delete").await.unwrap();
        assert!(!access.check("u1", "r-help", "vendors.delete").await);
    }

    #[tokio::test]
    async fn test_grant_is_idempotent() {
        let (_, _, access) = setup().await;
        access.check("u1", "r-help", "vendors.view").await;

        let role = access.grant("r-help", "p-view").await.unwrap();
        assert_eq!(role.permissions, vec!["p-view"]);
        assert!(access.check("u1", "r-help", "vendors.view").await);
    }

    #[tokio::test]
    async fn test_concurrent_grants_on_suspending_store() {
        let inner = MemoryRoleStore::new();
        for (id, module) in [("p-vendors", "vendors"), ("p-leads", "leads"), ("p-plans", "subscriptions")] {
            inner
                .insert_permission(PermissionRecord::new(id, Permission::new(module, Action::View, module)))
                .await
                .unwrap();
        }
        inner
            .insert_role(Role::new("r-tele", "Telecaller").with_permissions(["p-vendors"]))
            .await
            .unwrap();

        let store = Arc::new(YieldingStore { inner });
        let cache = Arc::new(PermissionCache::new(crate::config::CacheConfig::default()));
        let access = AccessControl::new(store.clone(), cache);

        let (a, b) = tokio::join!(access.grant("r-tele", "p-leads"), access.grant("r-tele", "p-plans"));
        a.unwrap();
        b.unwrap();

        let role = store.find_role_by_id("r-tele").await.unwrap().unwrap();
        assert_eq!(role.permissions.len(), 3);
        assert!(access.check("u1", "r-tele", "leads.view").await);
        assert!(access.check("u1", "r-tele", "subscriptions.view").await);

        let (a, b) = tokio::join!(access.revoke("r-tele", "p-leads"), access.revoke("r-tele", "p-plans"));
        a.unwrap();
        b.unwrap();
        let role = store.find_role_by_id("r-tele").await.unwrap().unwrap();
        assert_eq!(role.permissions, vec!["p-vendors"]);
    }

    #[tokio::test]
    async fn test_grant_unknown_role() {
        let (_, _, access) = setup().await;
        let result = access.grant("ghost", "p-view").await;
        assert!(matches!(result, Err(AccessError::RoleNotFound(_))));

        let result = access.revoke("ghost", "p-view").await;
        assert!(matches!(result, Err(AccessError::RoleNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_role() {
        let (store, _, access) = setup().await;
        access.check("u1", "r-help", "vendors.view").await;

        let result = access.delete_role("r-admin").await;
        assert!(matches!(result, Err(AccessError::SystemRole(_))));
        assert!(access.cache().has("u1").await);

        access.delete_role("r-help").await.unwrap();
        assert!(access.cache().is_empty().await);
        assert_eq!(store.role_count().await, 1);
        assert!(!access.check("u1", "r-help", "vendors.view").await);
    }

    #[tokio::test]
    async fn test_invalidate_user() {
        let (_, _, access) = setup().await;
        access.check("u1", "r-help", "vendors.view").await;
        access.check("u2", "r-help", "vendors.view").await;

        access.invalidate_user("u1").await;
        assert!(!access.cache().has("u1").await);
        assert!(access.cache().has("u2").await);

        access.invalidate_all().await;
        assert!(access.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_resolution_not_cached() {
        let (_, _, access) = setup().await;
        // Malformed id is a store failure
        assert!(access.permissions_for("u1", "").await.is_empty());
        assert!(!access.cache().has("u1").await);
    }

    #[tokio::test]
    async fn test_unknown_role_cached_as_empty() {
        let (_, _, access) = setup().await;
        assert!(access.permissions_for("u1", "ghost").await.is_empty());
        assert!(access.cache().has("u1").await);
    }
}
