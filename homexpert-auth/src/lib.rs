//! # HomeXpert Authentication
//!
//! Session tokens and the request guard that fronts the HomeXpert admin
//! back-office.
//!
//! ## Overview
//!
//! The homexpert-auth crate handles:
//! - **Claims**: Session token claims; the role claim may be a bare name or
//!   an embedded role object and is normalized once at verification
//! - **JWT**: Session issuing and verification
//! - **Guard**: Route classification and redirect decisions
//! - **Middleware**: Axum adapter for the guard
//!
//! ## Features
//!
//! - `jwt` (default): JWT token support using jsonwebtoken
//! - `axum` (default): `route_guard` middleware
//!
//! ## Usage
//!
//! ```rust,no_run
//! use homexpert_auth::{GuardConfig, JwtService, RoleClaim, RouteGuard};
//! use std::sync::Arc;
//!
//! let jwt = Arc::new(JwtService::with_secret("your-secret-key-of-decent-length").unwrap());
//!
//! let token = jwt
//!     .issue_session("665f1c2e9b1d4a0012345678", RoleClaim::with_id("admin", "665f1c2e9b1d4a00aaaaaaaa"))
//!     .unwrap();
//! let session = jwt.verify_session(&token).unwrap();
//! assert!(session.role.is_admin());
//!
//! let guard = RouteGuard::new(GuardConfig::from_env(), jwt);
//! ```
//!
//! ## Integration
//!
//! - `homexpert-rbac`: role names and the administrative role set
//! - `homexpert-access`: cached per-section capability checks

pub mod claims;
pub mod config;
pub mod error;
#[cfg(feature = "jwt")]
pub mod guard;
#[cfg(feature = "jwt")]
pub mod jwt;
#[cfg(feature = "axum")]
pub mod middleware;

// Re-export main types
pub use claims::{RoleClaim, RoleRef, Session, SessionClaims, SessionRole, TokenType};
pub use config::{GuardConfig, DEFAULT_SESSION_COOKIE};
pub use error::{AuthError, AuthResult};

#[cfg(feature = "jwt")]
pub use guard::{GuardDecision, RouteClass, RouteGuard};
#[cfg(feature = "jwt")]
pub use jwt::{JwtAlgorithm, JwtConfig, JwtService, TokenPair};

#[cfg(feature = "axum")]
pub use middleware::route_guard;
