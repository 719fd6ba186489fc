//! # Actions
//!
//! The closed set of actions a permission can grant on a module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that a permission grants.
///
/// The set is closed: permissions stored by the back-office only ever carry
/// one of these five values.
///
/// - **View**: read listings and details
/// - **Create**: add new records
/// - **Update**: edit existing records
/// - **Delete**: remove records
/// - **All**: every action on the permission's resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// View/read records.
    View,

    /// Create new records.
    Create,

    /// Update existing records.
    Update,

    /// Delete records.
    Delete,

    /// Every action.
    ///
    /// Combined with the `*` resource this forms the wildcard permission.
    All,
}

impl Action {
    /// Get the string representation of the action.
    ///
    /// # Returns
    ///
    /// A static, lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::All => "all",
        }
    }

    /// Parse an action from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, surrounding whitespace ignored)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use homexpert_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("DELETE"), Some(Action::Delete));
    /// assert_eq!(Action::parse("read"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "view" => Some(Action::View),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "all" => Some(Action::All),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::View,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::All,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
