//! JWT token generation and validation
//!
//! This module issues and verifies HomeXpert session tokens using the
//! jsonwebtoken crate. Sessions are signed with an HMAC secret shared by
//! the web app and the vendor mobile API.

use crate::claims::{RoleClaim, Session, SessionClaims, TokenType};
use crate::error::{AuthError, AuthResult};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JWT configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms
    pub secret: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: Vec<String>,

    /// Session (access) token duration
    pub session_duration: Duration,

    /// Refresh token duration
    pub refresh_duration: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: "homexpert".to_string(),
            audience: vec!["homexpert-web".to_string(), "homexpert-mobile".to_string()],
            session_duration: Duration::hours(24),
            refresh_duration: Duration::days(30),
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOMEXPERT_JWT_SECRET`: HMAC signing secret
    /// - `HOMEXPERT_JWT_ISSUER`: token issuer (default: homexpert)
    /// - `HOMEXPERT_JWT_AUDIENCE`: comma-separated audiences
    /// - `HOMEXPERT_SESSION_HOURS`: session lifetime in hours (default: 24)
    pub fn from_env() -> Self {
        let default = Self::default();

        let audience = std::env::var("HOMEXPERT_JWT_AUDIENCE")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|a| !a.is_empty())
            .unwrap_or(default.audience);

        let session_duration = std::env::var("HOMEXPERT_SESSION_HOURS")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|h| *h > 0)
            .map(Duration::hours)
            .unwrap_or(default.session_duration);

        Self {
            secret: std::env::var("HOMEXPERT_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            issuer: std::env::var("HOMEXPERT_JWT_ISSUER").unwrap_or(default.issuer),
            audience,
            session_duration,
            ..default
        }
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// JWT service for session tokens.
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration.
    ///
    /// Fails with [`AuthError::ConfigError`] when no secret is configured.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let secret = config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        Self::new(JwtConfig {
            secret: Some(secret.into()),
            ..Default::default()
        })
    }

    /// Create from [`JwtConfig::from_env`].
    pub fn from_env() -> AuthResult<Self> {
        Self::new(JwtConfig::from_env())
    }

    /// Claims for a new session, stamped with this service's issuer and audience.
    pub fn session_claims(&self, user_id: impl Into<String>, role: RoleClaim) -> SessionClaims {
        SessionClaims::new(user_id, role, self.config.session_duration)
            .with_issuer(self.config.issuer.clone(), self.config.audience.clone())
    }

    /// Issue a session token.
    pub fn issue_session(&self, user_id: impl Into<String>, role: RoleClaim) -> AuthResult<String> {
        self.encode_claims(&self.session_claims(user_id, role))
    }

    /// Issue an access/refresh pair for the vendor mobile app.
    pub fn issue_token_pair(&self, user_id: impl Into<String>, role: RoleClaim) -> AuthResult<TokenPair> {
        let user_id = user_id.into();
        let access = self.session_claims(user_id.clone(), role.clone());
        let refresh = SessionClaims::new(user_id, role, self.config.refresh_duration)
            .with_issuer(self.config.issuer.clone(), self.config.audience.clone())
            .with_token_type(TokenType::Refresh);

        Ok(TokenPair::new(
            self.encode_claims(&access)?,
            self.encode_claims(&refresh)?,
            self.config.session_duration.num_seconds(),
        ))
    }

    /// Encode existing claims.
    pub fn encode_claims(&self, claims: &SessionClaims) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&self.config.audience);

        let token_data: TokenData<SessionClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Verify a session token and normalize it into a [`Session`].
    ///
    /// Refresh tokens are not sessions and are rejected.
    pub fn verify_session(&self, token: &str) -> AuthResult<Session> {
        let claims = self.validate_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken("Not a session token".to_string()));
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingClaim("sub".to_string()));
        }

        let session = claims.to_session();
        if session.role.name.is_empty() {
            return Err(AuthError::MissingClaim("role".to_string()));
        }

        debug!(user_id = %session.user_id, role = %session.role.name, "Session verified");
        Ok(session)
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value.
    pub fn extract_bearer(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

/// Token pair containing access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,

    /// Refresh token (long-lived)
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token expiration in seconds
    pub expires_in: i64,
}

impl TokenPair {
    /// Create a new token pair.
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
