//! # Capabilities
//!
//! A capability is the `module.name` string a caller asks for, where `name`
//! is either an action or a resource of the module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed `module.name` capability request.
///
/// # Example
///
/// ```
/// use homexpert_rbac::Capability;
///
/// let cap = Capability::parse("vendors.view").unwrap();
/// assert_eq!(cap.module, "vendors");
/// assert_eq!(cap.name, "view");
/// assert!(Capability::parse("vendors").is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Capability {
    /// Module namespace.
    pub module: String,
    /// Action or resource name within the module.
    pub name: String,
}

impl Capability {
    /// Create a capability from its parts.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Parse a `module.name` string.
    ///
    /// The split happens at the last `.` so dotted module namespaces are
    /// kept intact. Both parts must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (module, name) = s.trim().rsplit_once('.')?;
        if module.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(module, name))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}
