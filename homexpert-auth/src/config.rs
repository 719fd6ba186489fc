//! Route guard configuration.
//!
//! Route lists are code defaults for the HomeXpert web app; redirect targets
//! and the session cookie name can be overridden from the environment.

use crate::error::{AuthError, AuthResult};
use homexpert_rbac::Capability;
use serde::{Deserialize, Serialize};

/// Default session cookie name.
pub const DEFAULT_SESSION_COOKIE: &str = "homexpert.session-token";

/// Route guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardConfig {
    /// Login page for administrative users.
    pub login_path: String,

    /// Page shown when an authenticated user lacks access.
    pub unauthorized_path: String,

    /// Landing page for administrative roles.
    pub admin_landing: String,

    /// Landing page for vendors.
    pub vendor_landing: String,

    /// Cookie carrying the session token.
    pub session_cookie: String,

    /// Prefixes never inspected (static assets, API routes).
    pub skip_prefixes: Vec<String>,

    /// Routes open to everyone.
    pub public_routes: Vec<String>,

    /// Login-type pages.
    pub auth_routes: Vec<String>,

    /// Protected administrative sections.
    pub admin_prefixes: Vec<String>,

    /// Admin path prefix → required capability.
    pub section_permissions: Vec<(String, Capability)>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/admin-login".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
            admin_landing: "/admin/dashboard".to_string(),
            vendor_landing: "/vendor/dashboard".to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            skip_prefixes: strings(&["/_next", "/api", "/static", "/images", "/favicon.ico"]),
            public_routes: strings(&[
                "/about",
                "/contact",
                "/services",
                "/vendors",
                "/blog",
                "/privacy-policy",
                "/terms",
                "/unauthorized",
            ]),
            auth_routes: strings(&["/auth"]),
            admin_prefixes: strings(&["/admin"]),
            section_permissions: Vec::new(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOMEXPERT_LOGIN_PATH`: admin login page (default: /auth/admin-login)
    /// - `HOMEXPERT_UNAUTHORIZED_PATH`: access denied page (default: /unauthorized)
    /// - `HOMEXPERT_ADMIN_LANDING`: admin landing page (default: /admin/dashboard)
    /// - `HOMEXPERT_VENDOR_LANDING`: vendor landing page (default: /vendor/dashboard)
    /// - `HOMEXPERT_SESSION_COOKIE`: session cookie name (default: homexpert.session-token)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            login_path: env_or("HOMEXPERT_LOGIN_PATH", default.login_path),
            unauthorized_path: env_or("HOMEXPERT_UNAUTHORIZED_PATH", default.unauthorized_path),
            admin_landing: env_or("HOMEXPERT_ADMIN_LANDING", default.admin_landing),
            vendor_landing: env_or("HOMEXPERT_VENDOR_LANDING", default.vendor_landing),
            session_cookie: env_or("HOMEXPERT_SESSION_COOKIE", default.session_cookie),
            ..default
        }
    }

    /// Require `capability` (`module.name`) for every path under `prefix`.
    ///
    /// Malformed capabilities are rejected with [`AuthError::ConfigError`].
    pub fn with_section(mut self, prefix: impl Into<String>, capability: &str) -> AuthResult<Self> {
        let required = Capability::parse(capability)
            .ok_or_else(|| AuthError::ConfigError(format!("Invalid section capability: {:?}", capability)))?;
        self.section_permissions.push((prefix.into(), required));
        Ok(self)
    }

    /// Capability required for an admin path. Longest matching prefix wins.
    pub fn required_capability(&self, path: &str) -> Option<&Capability> {
        self.section_permissions
            .iter()
            .filter(|(prefix, _)| under(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, capability)| capability)
    }
}

/// Check whether `path` equals `prefix` or lies beneath it.
pub(crate) fn under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.login_path, "/auth/admin-login");
        assert_eq!(config.unauthorized_path, "/unauthorized");
        assert_eq!(config.session_cookie, "homexpert.session-token");
        assert!(config.section_permissions.is_empty());
    }

    #[test]
    fn test_under() {
        assert!(under("/admin", "/admin"));
        assert!(under("/admin/vendors", "/admin"));
        assert!(under("/admin/vendors", "/admin/"));
        assert!(!under("/administrator", "/admin"));
        assert!(!under("/", "/"));
        assert!(!under("/vendor", "/admin"));
    }

    #[test]
    fn test_required_capability_longest_prefix() {
        let config = GuardConfig::default()
            .with_section("/admin/vendors", "vendors.view")
            .and_then(|c| c.with_section("/admin/vendors/approvals", "vendors.update"))
            .and_then(|c| c.with_section("/admin/leads", "leads.view"))
            .unwrap();

        let required = |path: &str| config.required_capability(path).map(|c| c.to_string());
        assert_eq!(required("/admin/vendors").as_deref(), Some("vendors.view"));
        assert_eq!(required("/admin/vendors/42").as_deref(), Some("vendors.view"));
        assert_eq!(required("/admin/vendors/approvals/7").as_deref(), Some("vendors.update"));
        assert_eq!(required("/admin/dashboard"), None);
        assert_eq!(required("/admin/vendorsx"), None);
    }

    #[test]
    fn test_malformed_section_capability_rejected() {
        for bad in ["vendors", "vendors.", ".view", ""] {
            let result = GuardConfig::default().with_section("/admin/vendors", bad);
            assert!(matches!(result, Err(AuthError::ConfigError(_))), "{:?}", bad);
        }
    }
}
