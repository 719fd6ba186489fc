//! Session token claims
//!
//! This module defines the JWT claims carried by HomeXpert session tokens
//! and the normalized [`Session`] produced once a token is verified.

use chrono::{DateTime, Utc};
use homexpert_rbac::{AdminRole, RoleName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Role claim as it appears in a token.
///
/// Older tokens carry the bare role name; newer ones embed the role
/// document's `name` (and `id`). Both shapes are accepted and normalized by
/// [`RoleClaim::normalize`].
///
/// # Example
///
/// ```
/// use homexpert_auth::claims::RoleClaim;
///
/// let plain: RoleClaim = serde_json::from_str(r#""Admin""#).unwrap();
/// let object: RoleClaim = serde_json::from_str(r#"{"name":"admin","id":"r1"}"#).unwrap();
/// assert_eq!(plain.normalize().name, object.normalize().name);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleClaim {
    /// Bare role name
    Name(String),

    /// Role reference object
    Object(RoleRef),
}

/// Embedded role reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRef {
    /// Role name
    pub name: String,

    /// Role document id
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RoleClaim {
    /// Claim carrying only a role name.
    pub fn name(name: impl Into<String>) -> Self {
        RoleClaim::Name(name.into())
    }

    /// Claim carrying a role name and document id.
    pub fn with_id(name: impl Into<String>, id: impl Into<String>) -> Self {
        RoleClaim::Object(RoleRef {
            name: name.into(),
            id: Some(id.into()),
        })
    }

    /// Normalize into the trusted session role.
    pub fn normalize(&self) -> SessionRole {
        match self {
            RoleClaim::Name(name) => SessionRole {
                name: RoleName::normalize(name),
                id: None,
            },
            RoleClaim::Object(role) => SessionRole {
                name: RoleName::normalize(&role.name),
                id: role.id.clone().filter(|id| !id.trim().is_empty()),
            },
        }
    }
}

/// Normalized role of a verified session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRole {
    /// Lowercase role name
    pub name: RoleName,

    /// Role document id, when the token carried one
    pub id: Option<String>,
}

impl SessionRole {
    /// The administrative role, if this is one.
    pub fn admin_role(&self) -> Option<AdminRole> {
        self.name.admin_role()
    }

    /// Check if this role may enter the back-office.
    pub fn is_admin(&self) -> bool {
        self.name.is_admin()
    }

    /// Check if this is the vendor role.
    pub fn is_vendor(&self) -> bool {
        self.name.is_vendor()
    }
}

/// Identity of a verified request.
///
/// Built from [`SessionClaims`] at the trust boundary; downstream code never
/// looks at raw claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// User identifier
    pub user_id: String,

    /// Normalized role
    pub role: SessionRole,

    /// User email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

/// Claims carried by a session token.
///
/// # Example
///
/// ```rust,no_run
/// use homexpert_auth::claims::{RoleClaim, SessionClaims};
///
/// let claims = SessionClaims::new(
///     "665f1c2e9b1d4a0012345678",
///     RoleClaim::with_id("telecaller", "665f1c2e9b1d4a00aaaaaaaa"),
///     chrono::Duration::hours(24),
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    // Standard JWT claims (RFC 7519)
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: Vec<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID
    pub jti: String,

    // HomeXpert claims
    /// Role claim, string or object
    pub role: RoleClaim,

    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// User display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Token type (access, refresh)
    #[serde(default)]
    pub token_type: TokenType,

    /// Custom claims for extensibility
    #[serde(default, flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl SessionClaims {
    /// Create new claims for a user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's identifier
    /// * `role` - The user's role claim
    /// * `duration` - Token validity duration
    pub fn new(user_id: impl Into<String>, role: RoleClaim, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.into(),
            iss: "homexpert".to_string(),
            aud: vec!["homexpert-web".to_string(), "homexpert-mobile".to_string()],
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            role,
            email: None,
            name: None,
            token_type: TokenType::Access,
            custom: HashMap::new(),
        }
    }

    /// The user identifier.
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Normalized role.
    pub fn session_role(&self) -> SessionRole {
        self.role.normalize()
    }

    /// Build the trusted session identity.
    pub fn to_session(&self) -> Session {
        Session {
            user_id: self.sub.clone(),
            role: self.session_role(),
            email: self.email.clone(),
            expires_at: self.exp,
        }
    }

    /// Set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Override issuer and audience.
    pub fn with_issuer(mut self, issuer: impl Into<String>, audience: Vec<String>) -> Self {
        self.iss = issuer.into();
        self.aud = audience;
        self
    }
}

/// Token type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Session/access token
    #[default]
    Access,

    /// Refresh token (vendor mobile app)
    Refresh,
}
