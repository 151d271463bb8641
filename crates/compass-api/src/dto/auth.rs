//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request a magic link
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address the link is issued for
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Magic link issued
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Status message
    pub message: String,
    /// Seconds until the link expires
    pub expires_in: u64,
}

/// Verify a magic link token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyRequest {
    /// Token from the magic link
    #[validate(length(min = 16, message = "Token is too short"))]
    pub token: String,
}

/// Access token issued after verification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}
