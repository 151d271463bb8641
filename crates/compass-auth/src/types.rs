//! Core authentication types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user information extracted from a validated token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: Uuid,
    /// User email
    pub email: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: String,
}

/// An issued access token with its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,
    /// Expiry (Unix timestamp)
    pub expires_at: i64,
    /// Lifetime in seconds
    pub expires_in: u64,
}
