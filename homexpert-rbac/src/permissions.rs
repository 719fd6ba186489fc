//! # Permissions
//!
//! Permission triples and the access decision function.
//! A permission grants an action on a resource inside a module namespace.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions::Action;

/// Resource value that, combined with [`Action::All`], forms the wildcard.
pub const WILDCARD_RESOURCE: &str = "*";

/// A `(module, action, resource)` capability triple.
///
/// The triple is unique across the store. A permission is matched against a
/// requested capability string in either `module.action` or
/// `module.resource` form.
///
/// # Example
///
/// ```
/// use homexpert_rbac::permissions::Permission;
/// use homexpert_rbac::actions::Action;
///
/// let perm = Permission::new("vendors", Action::View, "vendors");
/// assert_eq!(perm.name(), "vendors.view");
/// assert!(perm.matches("vendors.view"));
/// assert!(!perm.matches("vendors.delete"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// Free-text namespace (e.g. "vendors", "leads").
    pub module: String,
    /// The action granted.
    pub action: Action,
    /// Free-text noun the action applies to.
    pub resource: String,
}

impl Permission {
    /// Create a new permission.
    pub fn new(module: impl Into<String>, action: Action, resource: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action,
            resource: resource.into(),
        }
    }

    /// Create the wildcard permission (`*` resource, `all` action).
    ///
    /// # Example
    ///
    /// ```
    /// use homexpert_rbac::permissions::Permission;
    ///
    /// let any = Permission::wildcard("system");
    /// assert!(any.is_wildcard());
    /// assert!(any.matches("leads.delete"));
    /// ```
    pub fn wildcard(module: impl Into<String>) -> Self {
        Self::new(module, Action::All, WILDCARD_RESOURCE)
    }

    /// Derived display name, `resource.action`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.resource, self.action.as_str())
    }

    /// The uniqueness key of this permission.
    pub fn key(&self) -> (&str, Action, &str) {
        (self.module.as_str(), self.action, self.resource.as_str())
    }

    /// Check if this is the wildcard permission.
    pub fn is_wildcard(&self) -> bool {
        self.action == Action::All && self.resource == WILDCARD_RESOURCE
    }

    /// Check whether this permission grants the requested capability.
    ///
    /// The wildcard grants everything, in any module. Otherwise the request
    /// must textually equal `{module}.{action}` or `{module}.{resource}`.
    pub fn matches(&self, requested: &str) -> bool {
        if self.is_wildcard() {
            return true;
        }

        requested
            .strip_prefix(self.module.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .map(|rest| rest == self.action.as_str() || rest == self.resource)
            .unwrap_or(false)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.module, self.action, self.resource)
    }
}

/// A permission document as kept by the role/permission store.
///
/// Roles reference permissions by [`PermissionRecord::id`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRecord {
    /// Store identifier.
    pub id: String,

    /// The capability triple.
    #[serde(flatten)]
    pub permission: Permission,

    /// Human readable description shown in the back-office.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PermissionRecord {
    /// Create a new record.
    pub fn new(id: impl Into<String>, permission: Permission) -> Self {
        Self {
            id: id.into(),
            permission,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Decide whether a resolved permission list grants `requested`.
///
/// `requested` is `"module.action"` or `"module.resource"`. An empty list
/// always denies.
///
/// # Example
///
/// ```
/// use homexpert_rbac::{has_permission, Action, Permission};
///
/// let perms = vec![Permission::new("vendors", Action::View, "vendors")];
/// assert!(has_permission(&perms, "vendors.view"));
/// assert!(!has_permission(&perms, "vendors.delete"));
/// ```
pub fn has_permission(permissions: &[Permission], requested: &str) -> bool {
    permissions.iter().any(|perm| perm.matches(requested))
}

/// Check that at least one of `requested` is granted.
pub fn has_any_permission(permissions: &[Permission], requested: &[&str]) -> bool {
    requested.iter().any(|r| has_permission(permissions, r))
}

/// Check that every entry of `requested` is granted.
///
/// An empty request list is trivially satisfied.
pub fn has_all_permissions(permissions: &[Permission], requested: &[&str]) -> bool {
    requested.iter().all(|r| has_permission(permissions, r))
}
