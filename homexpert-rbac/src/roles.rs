//! Roles
//!
//! Role documents, role-name normalization, and the closed set of
//! administrative roles allowed into the back-office.

use serde::{Deserialize, Serialize};

/// Name of the single non-administrative role known to the route guard.
pub const VENDOR_ROLE: &str = "vendor";

/// Normalized role name.
///
/// Role names are unique and compared case-insensitively. Every comparison
/// goes through [`RoleName::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Normalize a raw role name (trimmed, lowercase).
    ///
    /// # Examples
    ///
    /// ```
    /// use homexpert_rbac::RoleName;
    ///
    /// assert_eq!(RoleName::normalize(" Admin "), RoleName::normalize("admin"));
    /// assert_eq!(RoleName::normalize("Admin").as_str(), "admin");
    /// ```
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the name is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The administrative role this name denotes, if any.
    pub fn admin_role(&self) -> Option<AdminRole> {
        AdminRole::parse(&self.0)
    }

    /// Check if this is an administrative role.
    pub fn is_admin(&self) -> bool {
        self.admin_role().is_some()
    }

    /// Check if this is the vendor role.
    pub fn is_vendor(&self) -> bool {
        self.0 == VENDOR_ROLE
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles permitted to reach admin-prefixed routes.
///
/// This set is fixed in code; it is not stored alongside roles.
///
/// # Examples
///
/// ```
/// use homexpert_rbac::AdminRole;
///
/// assert_eq!(AdminRole::parse("Helpline"), Some(AdminRole::Helpline));
/// assert_eq!(AdminRole::parse("vendor"), None);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Full back-office administrator.
    Admin,

    /// Support staff handling vendor and customer calls.
    Helpline,

    /// Outbound sales staff working leads.
    Telecaller,
}

impl AdminRole {
    /// Parse from a role name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "helpline" => Some(Self::Helpline),
            "telecaller" => Some(Self::Telecaller),
            _ => None,
        }
    }

    /// Lowercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Helpline => "helpline",
            Self::Telecaller => "telecaller",
        }
    }

    /// Every administrative role.
    pub fn all() -> [Self; 3] {
        [Self::Admin, Self::Helpline, Self::Telecaller]
    }
}

/// Check if a raw role name belongs to the administrative set.
pub fn is_admin_role(name: &str) -> bool {
    AdminRole::parse(name).is_some()
}

/// A role document.
///
/// A role bundles an ordered list of permission references. Each user holds
/// exactly one role.
///
/// # Examples
///
/// ```
/// use homexpert_rbac::Role;
///
/// let mut role = Role::new("r1", "Telecaller").with_permissions(["p1", "p2"]);
/// assert!(role.add_permission("p3"));
/// assert!(!role.add_permission("p1"));
/// assert_eq!(role.permissions, vec!["p1", "p2", "p3"]);
/// assert!(role.is_named("TELECALLER"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Store identifier.
    pub id: String,

    /// Display name, unique case-insensitively.
    pub name: String,

    /// Description shown in the back-office.
    #[serde(default)]
    pub description: String,

    /// Ordered permission references.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// System roles cannot be deleted.
    #[serde(default)]
    pub is_system_role: bool,
}

impl Role {
    /// Create a new, non-system role with no permissions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            permissions: Vec::new(),
            is_system_role: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append permission references, skipping duplicates.
    pub fn with_permissions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.add_permission(id);
        }
        self
    }

    /// Mark as a system role.
    pub fn system(mut self) -> Self {
        self.is_system_role = true;
        self
    }

    /// Normalized name.
    pub fn role_name(&self) -> RoleName {
        RoleName::normalize(&self.name)
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.role_name() == RoleName::normalize(name)
    }

    /// Add a permission reference.
    ///
    /// # Returns
    ///
    /// `false` if the reference was already present
    pub fn add_permission(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.permissions.contains(&id) {
            return false;
        }
        self.permissions.push(id);
        true
    }

    /// Remove a permission reference.
    ///
    /// # Returns
    ///
    /// `true` if the reference was present
    pub fn remove_permission(&mut self, id: &str) -> bool {
        let before = self.permissions.len();
        self.permissions.retain(|p| p != id);
        self.permissions.len() != before
    }

    /// Check if the role can be deleted by a user.
    pub fn is_deletable(&self) -> bool {
        !self.is_system_role
    }
}
