//! Route guard
//!
//! Classifies every inbound request and decides whether it passes through
//! or is redirected. Decisions depend only on the path, the session token
//! and the permissions of the token's role.
//!
//! ```text
//! path ─┬─ Skipped / Public ─────────────────────────→ Continue
//!       ├─ AuthRoute ── signed in? ── admin → admin landing
//!       │                          └─ vendor → vendor landing
//!       ├─ AdminRoute ── no session → login?callbackUrl=…
//!       │              ├─ not admin → /unauthorized
//!       │              ├─ section capability denied → /unauthorized
//!       │              └─ ok → Continue
//!       └─ Root / Unclassified ── admin → admin landing
//! ```

use crate::claims::Session;
use crate::config::{under, GuardConfig};
use crate::jwt::JwtService;
use homexpert_access::AccessControl;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, Uri};
use std::sync::Arc;
use tracing::{debug, warn};

/// Route classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Static asset or excluded API path
    Skipped,
    /// Open to everyone
    Public,
    /// Login-type page
    AuthRoute,
    /// Protected administrative section
    AdminRoute,
    /// Site root
    Root,
    /// Anything else
    Unclassified,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through
    Continue,
    /// Redirect (302) to the given location
    Redirect(String),
}

impl GuardDecision {
    /// Check if the request passes through.
    pub fn is_continue(&self) -> bool {
        matches!(self, GuardDecision::Continue)
    }

    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            GuardDecision::Redirect(location) => Some(location.as_str()),
            GuardDecision::Continue => None,
        }
    }
}

/// Request guard for the HomeXpert web app.
///
/// # Example
///
/// ```rust,no_run
/// use homexpert_auth::{GuardConfig, JwtService, RouteGuard};
/// use std::sync::Arc;
///
/// async fn example() {
///     let jwt = Arc::new(JwtService::with_secret("a-long-enough-secret-for-hmac").unwrap());
///     let guard = RouteGuard::new(GuardConfig::default(), jwt);
///
///     let uri: http::Uri = "/admin/dashboard".parse().unwrap();
///     let decision = guard.check(&uri, &http::HeaderMap::new()).await;
///     assert_eq!(
///         decision.location(),
///         Some("/auth/admin-login?callbackUrl=%2Fadmin%2Fdashboard")
///     );
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouteGuard {
    config: GuardConfig,
    jwt: Arc<JwtService>,
    access: Option<AccessControl>,
}

impl RouteGuard {
    /// Create a guard with role-only checks.
    pub fn new(config: GuardConfig, jwt: Arc<JwtService>) -> Self {
        Self {
            config,
            jwt,
            access: None,
        }
    }

    /// Enable per-section capability checks.
    pub fn with_access_control(mut self, access: AccessControl) -> Self {
        self.access = Some(access);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Classify a request path.
    pub fn classify(&self, path: &str) -> RouteClass {
        let config = &self.config;
        let admin = config.admin_prefixes.iter().any(|p| under(path, p));

        // Admin sections are never skipped, whatever their last segment looks like
        if config.skip_prefixes.iter().any(|p| under(path, p)) || (!admin && is_asset(path)) {
            RouteClass::Skipped
        } else if config.public_routes.iter().any(|p| under(path, p)) {
            RouteClass::Public
        } else if config.auth_routes.iter().any(|p| under(path, p)) {
            RouteClass::AuthRoute
        } else if admin {
            RouteClass::AdminRoute
        } else if path.is_empty() || path == "/" {
            RouteClass::Root
        } else {
            RouteClass::Unclassified
        }
    }

    /// Session token from the `Authorization` header or the session cookie.
    pub fn session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(JwtService::extract_bearer)
            .or_else(|| cookie_value(headers, &self.config.session_cookie))
    }

    /// Verified session, if the request carries a valid token.
    ///
    /// Any verification failure is treated as no session.
    pub fn session(&self, headers: &HeaderMap) -> Option<Session> {
        let token = self.session_token(headers)?;
        match self.jwt.verify_session(token) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                None
            }
        }
    }

    /// Check a request.
    pub async fn check(&self, uri: &Uri, headers: &HeaderMap) -> GuardDecision {
        let session = self.session(headers);
        self.decide(uri.path(), uri.query(), session.as_ref()).await
    }

    /// Decide for an already verified (or absent) session.
    pub async fn decide(&self, path: &str, query: Option<&str>, session: Option<&Session>) -> GuardDecision {
        let class = self.classify(path);

        let decision = match class {
            RouteClass::Skipped | RouteClass::Public => GuardDecision::Continue,

            RouteClass::AuthRoute => match session.and_then(|s| self.landing_for(s)) {
                Some(landing) => GuardDecision::Redirect(landing.to_string()),
                None => GuardDecision::Continue,
            },

            RouteClass::AdminRoute => match session {
                None => GuardDecision::Redirect(self.login_redirect(path, query)),
                Some(s) if !s.role.is_admin() => {
                    warn!(user_id = %s.user_id, role = %s.role.name, path = %path, "Non-admin role on admin route");
                    GuardDecision::Redirect(self.config.unauthorized_path.clone())
                }
                Some(s) => {
                    if self.section_allowed(path, s).await {
                        GuardDecision::Continue
                    } else {
                        GuardDecision::Redirect(self.config.unauthorized_path.clone())
                    }
                }
            },

            RouteClass::Root | RouteClass::Unclassified => match session {
                Some(s) if s.role.is_admin() => GuardDecision::Redirect(self.config.admin_landing.clone()),
                _ => GuardDecision::Continue,
            },
        };

        debug!(path = %path, class = ?class, decision = ?decision, "Route guard decision");
        decision
    }

    fn landing_for(&self, session: &Session) -> Option<&str> {
        if session.role.is_admin() {
            Some(self.config.admin_landing.as_str())
        } else if session.role.is_vendor() {
            Some(self.config.vendor_landing.as_str())
        } else {
            None
        }
    }

    fn login_redirect(&self, path: &str, query: Option<&str>) -> String {
        let callback = match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };
        format!("{}?callbackUrl={}", self.config.login_path, urlencoding::encode(&callback))
    }

    async fn section_allowed(&self, path: &str, session: &Session) -> bool {
        let Some(capability) = self.config.required_capability(path) else {
            return true;
        };

        let Some(access) = &self.access else {
            warn!(path = %path, capability = %capability, "Section requires a capability but no access control is configured");
            return false;
        };

        let Some(role_id) = session.role.id.as_deref() else {
            warn!(user_id = %session.user_id, capability = %capability, "Role claim has no id, denying");
            return false;
        };

        let allowed = access
            .check(&session.user_id, role_id, &capability.to_string())
            .await;
        if !allowed {
            warn!(user_id = %session.user_id, capability = %capability, path = %path, "Section access denied");
        }
        allowed
    }
}

/// Last path segment carries a file extension.
fn is_asset(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
