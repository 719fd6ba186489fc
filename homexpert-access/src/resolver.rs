//! Permission resolution
//!
//! Turns a role identifier into the role's effective permission list by
//! joining the role document with its permission documents.

use crate::error::AccessResult;
use crate::store::RoleStore;
use homexpert_rbac::Permission;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves role identifiers into permission lists.
///
/// Resolution fails closed: any store failure yields an empty list, which
/// the decision function denies.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish_non_exhaustive()
    }
}

impl PermissionResolver {
    /// Create a resolver over a store.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn RoleStore> {
        &self.store
    }

    /// Resolve a role's permissions, never failing.
    ///
    /// Unknown roles and store failures both yield an empty list. Failures
    /// are logged.
    pub async fn resolve(&self, role_id: &str) -> Vec<Permission> {
        match self.try_resolve(role_id).await {
            Ok(permissions) => permissions,
            Err(e) => {
                warn!(role_id = %role_id, error = %e, "Permission resolution failed, denying");
                Vec::new()
            }
        }
    }

    /// Resolve a role's permissions, surfacing store failures.
    ///
    /// An unknown role is not an error and yields an empty list. A role with
    /// no permission references returns without a second lookup.
    pub async fn try_resolve(&self, role_id: &str) -> AccessResult<Vec<Permission>> {
        let Some(role) = self.store.find_role_by_id(role_id).await? else {
            debug!(role_id = %role_id, "Role not found");
            return Ok(Vec::new());
        };

        if role.permissions.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.store.find_permissions_by_ids(&role.permissions).await?;
        debug!(
            role_id = %role_id,
            role = %role.name,
            count = records.len(),
            "Resolved role permissions"
        );

        Ok(records.into_iter().map(|r| r.permission).collect())
    }
}
