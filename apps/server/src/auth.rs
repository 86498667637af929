//! JWT authentication module.
//!
//! Handles sign-in against the configured allow-list, token issuing and
//! validation, and the request extractors that gate routes by role.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login {email, password, role}                           │
//! │       │                                                                 │
//! │       ├── UserDirectory::authenticate  (argon2 verify, role check)      │
//! │       └── JwtManager::issue            (HS256, sub/role/iat/exp/jti)    │
//! │                                                                         │
//! │  GET /api/...  Authorization: Bearer <jwt>                              │
//! │       │                                                                 │
//! │       ├── AuthUser   ──► 401 UNAUTHORIZED if missing/invalid            │
//! │       └── AdminUser  ──► 403 FORBIDDEN unless role = admin              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use vape_core::Role;

use crate::config::UserEntry;
use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,

    /// Role the user signed in as
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issues a token for `email` acting as `role`.
    pub fn issue(&self, email: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))
    }
}

/// The configured allow-list, keyed by lowercase email.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserEntry>,
}

impl UserDirectory {
    pub fn new(entries: &[UserEntry]) -> Self {
        let users = entries
            .iter()
            .map(|entry| (entry.email.trim().to_lowercase(), entry.clone()))
            .collect();
        UserDirectory { users }
    }

    /// Checks the password and whether the user may act as `requested`.
    ///
    /// Unknown users and wrong passwords get the same answer.
    pub fn authenticate(&self, email: &str, password: &str, requested: Role) -> Result<String, ApiError> {
        let email = email.trim().to_lowercase();
        let entry = self
            .users
            .get(&email)
            .filter(|entry| verify_password(password, &entry.password_hash))
            .ok_or_else(|| {
                warn!(email = %email, "Sign-in rejected");
                ApiError::unauthorized("Invalid email or password")
            })?;

        if !entry.role.can_act_as(requested) {
            warn!(email = %email, role = %entry.role, requested = %requested, "Role not allowed");
            return Err(ApiError::forbidden(format!("Not allowed to sign in as {}", requested)));
        }

        debug!(email = %email, role = %requested, "Sign-in accepted");
        Ok(email)
    }
}

/// Verify a password against its PHC hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a password for the allow-list.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.0.sub
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        match self.0.role {
            Role::Admin => Ok(()),
            Role::Seller => Err(ApiError::forbidden("Admin role required")),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token =
            extract_bearer_token(header).ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

        state.jwt.validate(token).map(AuthUser)
    }
}

/// A signed-in admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_admin()?;
        Ok(AdminUser(user.0))
    }
}
