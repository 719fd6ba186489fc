//! # HomeXpert RBAC (Role-Based Access Control)
//!
//! Role and permission model for the HomeXpert admin back-office.
//!
//! ## Overview
//!
//! The homexpert-rbac crate handles:
//! - **Actions**: The closed set `view | create | update | delete | all`
//! - **Permissions**: `(module, action, resource)` triples
//! - **Capabilities**: `module.action` / `module.resource` request strings
//! - **Roles**: Permission bundles, one per user, plus the administrative role set
//!
//! ## Architecture
//!
//! ```text
//! Permission = Module + Action + Resource
//!
//! Examples:
//!   vendors:view:vendors   - grants "vendors.view" and "vendors.vendors"
//!   system:all:*           - wildcard, grants every capability
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use homexpert_rbac::{has_permission, Action, Permission};
//!
//! let perms = vec![
//!     Permission::new("vendors", Action::View, "vendors"),
//!     Permission::new("leads", Action::Update, "leads"),
//! ];
//!
//! assert!(has_permission(&perms, "vendors.view"));
//! assert!(has_permission(&perms, "leads.leads"));
//! assert!(!has_permission(&perms, "vendors.delete"));
//!
//! // The wildcard grants everything
//! assert!(has_permission(&[Permission::wildcard("system")], "vendors.delete"));
//! ```
//!
//! ## Role Names
//!
//! Role names are compared case-insensitively through [`RoleName`]. The
//! administrative set ([`AdminRole`]) is fixed in code: `admin`, `helpline`,
//! `telecaller`.

pub mod actions;
pub mod capability;
pub mod permissions;
pub mod roles;

// Re-export main types for convenience
pub use actions::Action;
pub use capability::Capability;
pub use permissions::{
    has_all_permissions, has_any_permission, has_permission, Permission, PermissionRecord,
    WILDCARD_RESOURCE,
};
pub use roles::{is_admin_role, AdminRole, Role, RoleName, VENDOR_ROLE};
