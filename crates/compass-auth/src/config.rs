//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Magic link configuration
    pub magic_link: MagicLinkConfig,
}

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens (should be at least 256 bits)
    pub secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set in production
            access_token_lifetime: Duration::from_secs(30 * 60), // 30 minutes
            issuer: "budget-compass".to_string(),
            audience: "budget-compass-api".to_string(),
        }
    }
}

/// Magic link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkConfig {
    /// Link token length in bytes
    pub token_length: usize,
    /// Link lifetime
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
    /// Base URL the link points at
    pub base_url: String,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            token_length: 32, // 256 bits
            lifetime: Duration::from_secs(15 * 60), // 15 minutes
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.jwt.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("JWT_AUDIENCE") {
            config.jwt.audience = audience;
        }
        if let Ok(base_url) = std::env::var("MAGIC_LINK_BASE_URL") {
            config.magic_link.base_url = base_url;
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.jwt.secret.is_empty() {
            errors.push("JWT secret must be set".to_string());
        } else if self.jwt.secret.len() < 32 {
            errors.push("JWT secret should be at least 256 bits (32 bytes)".to_string());
        }

        if self.magic_link.token_length < 16 {
            errors.push("Magic link token length should be at least 128 bits (16 bytes)".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt.access_token_lifetime, Duration::from_secs(30 * 60));
        assert_eq!(config.magic_link.lifetime, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = AuthConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_valid() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "a".repeat(32);
        assert!(config.validate().is_ok());
    }
}
