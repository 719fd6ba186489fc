//! Error types for role/permission storage and access control.

use thiserror::Error;

/// Access control error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The backing store failed (unreachable, timed out, bad response)
    #[error("Store error: {0}")]
    Store(String),

    /// An identifier is malformed
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    /// Role does not exist
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Permission does not exist
    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    /// A role with the same (case-insensitive) name exists
    #[error("Role already exists: {0}")]
    DuplicateRole(String),

    /// A permission with the same (module, action, resource) exists
    #[error("Permission already exists: {0}")]
    DuplicatePermission(String),

    /// System roles cannot be deleted
    #[error("System role cannot be deleted: {0}")]
    SystemRole(String),
}

/// Result type for access control operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error comes from infrastructure rather than the caller.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::InvalidId(_) => 400,
            AccessError::RoleNotFound(_) | AccessError::PermissionNotFound(_) => 404,
            AccessError::DuplicateRole(_) | AccessError::DuplicatePermission(_) => 409,
            AccessError::SystemRole(_) => 403,
            AccessError::Store(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Store(_) => "STORE_ERROR",
            AccessError::InvalidId(_) => "INVALID_ID",
            AccessError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            AccessError::PermissionNotFound(_) => "PERMISSION_NOT_FOUND",
            AccessError::DuplicateRole(_) => "DUPLICATE_ROLE",
            AccessError::DuplicatePermission(_) => "DUPLICATE_PERMISSION",
            AccessError::SystemRole(_) => "SYSTEM_ROLE",
        }
    }
}
