//! Budget Compass Authentication Layer
//!
//! Passwordless authentication for the Budget Compass API:
//!
//! - **Magic Links**: single-use, short-lived login tokens delivered out of
//!   band (logged in development)
//! - **JWT Access Tokens**: issued once a magic link is verified
//!
//! # Flow
//!
//! ```text
//! POST /api/auth/login  → MagicLinkService::issue → link logged
//! POST /api/auth/verify → MagicLinkService::consume → JwtService::generate
//! Request + Bearer      → AuthMiddleware → AuthenticatedUser extension
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod magic_link;
pub mod middleware;
pub mod types;

pub use config::{AuthConfig, JwtConfig, MagicLinkConfig};
pub use error::{AuthError, AuthResult};
pub use jwt::JwtService;
pub use magic_link::MagicLinkService;
pub use middleware::{AuthLayer, AuthMiddleware, RequireAuth};
pub use types::*;

use std::sync::Arc;

/// Main authentication service combining magic links and JWT issuance
#[derive(Clone)]
pub struct AuthService {
    pub jwt: JwtService,
    pub magic_links: MagicLinkService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(config: AuthConfig) -> Self {
        let jwt = JwtService::new(config.jwt.clone());
        let magic_links = MagicLinkService::new(config.magic_link.clone());

        Self {
            jwt,
            magic_links,
            config,
        }
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an auth layer for the Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(Arc::new(self.jwt.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_full_login_flow() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string();
        let service = AuthService::new(config);

        let link_token = service.magic_links.issue("user@example.com").await.unwrap();
        let email = service.magic_links.consume(&link_token).await.unwrap();
        assert_eq!(email, "user@example.com");

        let issued = service
            .jwt
            .generate_access_token(Uuid::new_v4(), &email)
            .unwrap();
        let claims = service.jwt.validate_access_token(&issued.token).unwrap();
        assert_eq!(claims.email, "user@example.com");
    }
}
