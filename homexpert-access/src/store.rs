//! Role/permission store
//!
//! This module provides the store abstraction the resolver reads from and
//! an in-memory implementation. The production MongoDB adapter lives in the
//! application and implements [`RoleStore`].

use crate::error::{AccessError, AccessResult};
use async_trait::async_trait;
use homexpert_rbac::{PermissionRecord, Role, RoleName};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persistent role → permission mapping.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch a role by identifier.
    ///
    /// Returns `Ok(None)` if no such role exists. Malformed identifiers are
    /// an error.
    async fn find_role_by_id(&self, id: &str) -> AccessResult<Option<Role>>;

    /// Fetch a role by name (case-insensitive).
    async fn find_role_by_name(&self, name: &str) -> AccessResult<Option<Role>>;

    /// Fetch every permission whose identifier is in `ids`, in one lookup.
    ///
    /// Unknown identifiers are skipped.
    async fn find_permissions_by_ids(&self, ids: &[String]) -> AccessResult<Vec<PermissionRecord>>;

    /// List all roles.
    async fn list_roles(&self) -> AccessResult<Vec<Role>>;

    /// Insert a new role.
    async fn insert_role(&self, role: Role) -> AccessResult<Role>;

    /// Insert a new permission.
    async fn insert_permission(&self, record: PermissionRecord) -> AccessResult<PermissionRecord>;

    /// Replace a role's permission references.
    async fn set_role_permissions(&self, role_id: &str, permission_ids: Vec<String>) -> AccessResult<Role>;

    /// Add one permission reference to a role as a single update.
    ///
    /// Adding a reference the role already holds leaves it unchanged.
    async fn add_role_permission(&self, role_id: &str, permission_id: &str) -> AccessResult<Role>;

    /// Remove one permission reference from a role as a single update.
    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AccessResult<Role>;

    /// Delete a role. System roles are rejected.
    async fn delete_role(&self, role_id: &str) -> AccessResult<()>;
}

#[derive(Debug, Default)]
struct StoreState {
    roles: HashMap<String, Role>,
    permissions: HashMap<String, PermissionRecord>,
}

/// In-memory role store.
///
/// This is suitable for single-process deployments and testing.
///
/// Identifiers must be non-empty; an empty identifier on insert is replaced
/// by a generated UUIDv7.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryRoleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored roles.
    pub async fn role_count(&self) -> usize {
        self.state.read().await.roles.len()
    }

    /// Number of stored permissions.
    pub async fn permission_count(&self) -> usize {
        self.state.read().await.permissions.len()
    }

    fn check_id(id: &str) -> AccessResult<()> {
        if id.trim().is_empty() {
            return Err(AccessError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    fn assign_id(id: String) -> String {
        if id.trim().is_empty() {
            uuid::Uuid::now_v7().to_string()
        } else {
            id
        }
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_role_by_id(&self, id: &str) -> AccessResult<Option<Role>> {
        Self::check_id(id)?;
        Ok(self.state.read().await.roles.get(id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AccessResult<Option<Role>> {
        let wanted = RoleName::normalize(name);
        let state = self.state.read().await;
        Ok(state.roles.values().find(|r| r.role_name() == wanted).cloned())
    }

    async fn find_permissions_by_ids(&self, ids: &[String]) -> AccessResult<Vec<PermissionRecord>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.permissions.get(id).cloned())
            .collect())
    }

    async fn list_roles(&self) -> AccessResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.role_name().cmp(&b.role_name()));
        Ok(roles)
    }

    async fn insert_role(&self, mut role: Role) -> AccessResult<Role> {
        role.id = Self::assign_id(role.id);
        let name = role.role_name();
        if name.is_empty() {
            return Err(AccessError::InvalidId(role.name));
        }

        let mut state = self.state.write().await;
        if state.roles.contains_key(&role.id) {
            return Err(AccessError::DuplicateRole(role.id));
        }
        if state.roles.values().any(|r| r.role_name() == name) {
            return Err(AccessError::DuplicateRole(role.name));
        }
        if let Some(missing) = role
            .permissions
            .iter()
            .find(|id| !state.permissions.contains_key(*id))
        {
            return Err(AccessError::PermissionNotFound(missing.clone()));
        }

        state.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn insert_permission(&self, mut record: PermissionRecord) -> AccessResult<PermissionRecord> {
        record.id = Self::assign_id(record.id);

        let mut state = self.state.write().await;
        if state.permissions.contains_key(&record.id) {
            return Err(AccessError::DuplicatePermission(record.id));
        }
        let key = record.permission.key();
        if state.permissions.values().any(|p| p.permission.key() == key) {
            return Err(AccessError::DuplicatePermission(record.permission.to_string()));
        }

        state.permissions.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn set_role_permissions(&self, role_id: &str, permission_ids: Vec<String>) -> AccessResult<Role> {
        Self::check_id(role_id)?;
        let mut state = self.state.write().await;

        if let Some(missing) = permission_ids
            .iter()
            .find(|id| !state.permissions.contains_key(*id))
        {
            return Err(AccessError::PermissionNotFound(missing.clone()));
        }

        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| AccessError::RoleNotFound(role_id.to_string()))?;
        role.permissions.clear();
        for id in permission_ids {
            role.add_permission(id);
        }
        Ok(role.clone())
    }

    async fn add_role_permission(&self, role_id: &str, permission_id: &str) -> AccessResult<Role> {
        Self::check_id(role_id)?;
        let mut state = self.state.write().await;

        if !state.permissions.contains_key(permission_id) {
            return Err(AccessError::PermissionNotFound(permission_id.to_string()));
        }

        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| AccessError::RoleNotFound(role_id.to_string()))?;
        role.add_permission(permission_id);
        Ok(role.clone())
    }

    async fn remove_role_permission(&self, role_id: &str, permission_id: &str) -> AccessResult<Role> {
        Self::check_id(role_id)?;
        let mut state = self.state.write().await;

        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| AccessError::RoleNotFound(role_id.to_string()))?;
        role.remove_permission(permission_id);
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> AccessResult<()> {
        Self::check_id(role_id)?;
        let mut state = self.state.write().await;

        let role = state
            .roles
            .get(role_id)
            .ok_or_else(|| AccessError::RoleNotFound(role_id.to_string()))?;
        if !role.is_deletable() {
            return Err(AccessError::SystemRole(role.name.clone()));
        }

        state.roles.remove(role_id);
        Ok(())
    }
}
