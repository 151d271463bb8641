//! Magic link service
//!
//! Issues single-use login tokens with a TTL. Tokens are kept in an
//! in-process map; a distributed store can be swapped in behind the same
//! interface.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::MagicLinkConfig;
use crate::error::{AuthError, AuthResult};

/// A pending magic link awaiting verification
#[derive(Debug, Clone)]
struct PendingLink {
    email: String,
    expires_at: DateTime<Utc>,
}

/// Magic link service
#[derive(Clone)]
pub struct MagicLinkService {
    config: MagicLinkConfig,
    links: Arc<RwLock<HashMap<String, PendingLink>>>,
}

impl MagicLinkService {
    /// Create a new magic link service
    pub fn new(config: MagicLinkConfig) -> Self {
        Self {
            config,
            links: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue a new single-use token for an email address
    pub async fn issue(&self, email: &str) -> AuthResult<String> {
        let token = self.generate_token();
        let expires_at = Utc::now()
            + Duration::from_std(self.config.lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut links = self.links.write().await;
        links.insert(
            token.clone(),
            PendingLink {
                email: email.to_string(),
                expires_at,
            },
        );

        Ok(token)
    }

    /// Build the full login URL for a token
    pub fn link_url(&self, token: &str) -> String {
        format!("{}/auth/verify?token={}", self.config.base_url, token)
    }

    /// Consume a token, returning the email it was issued for.
    /// Tokens are single use; a second consume fails.
    pub async fn consume(&self, token: &str) -> AuthResult<String> {
        let mut links = self.links.write().await;
        let link = links.remove(token).ok_or(AuthError::MagicLinkInvalid)?;

        if link.expires_at < Utc::now() {
            return Err(AuthError::MagicLinkExpired);
        }

        Ok(link.email)
    }

    /// Drop expired links. Called opportunistically on issue paths.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|_, link| link.expires_at >= now);
        let removed = before - links.len();
        if removed > 0 {
            tracing::debug!(removed, "Expired magic links removed");
        }
        removed
    }

    fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.config.token_length];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> MagicLinkService {
        MagicLinkService::new(MagicLinkConfig::default())
    }

    #[tokio::test]
    async fn test_issue_and_consume() {
        let service = test_service();

        let token = service.issue("test@example.com").await.unwrap();
        assert_eq!(token.len(), 64); // 32 bytes hex-encoded

        let email = service.consume(&token).await.unwrap();
        assert_eq!(email, "test@example.com");
    }

    #[tokio::test]
    async fn test_single_use() {
        let service = test_service();

        let token = service.issue("test@example.com").await.unwrap();
        service.consume(&token).await.unwrap();

        let result = service.consume(&token).await;
        assert!(matches!(result, Err(AuthError::MagicLinkInvalid)));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let service = test_service();
        let result = service.consume("no-such-token").await;
        assert!(matches!(result, Err(AuthError::MagicLinkInvalid)));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let service = test_service();

        let token = service.issue("test@example.com").await.unwrap();
        {
            let mut links = service.links.write().await;
            links.get_mut(&token).unwrap().expires_at = Utc::now() - Duration::seconds(1);
        }

        let result = service.consume(&token).await;
        assert!(matches!(result, Err(AuthError::MagicLinkExpired)));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let service = test_service();

        let stale = service.issue("old@example.com").await.unwrap();
        service.issue("fresh@example.com").await.unwrap();
        {
            let mut links = service.links.write().await;
            links.get_mut(&stale).unwrap().expires_at = Utc::now() - Duration::seconds(1);
        }

        let removed = service.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert!(matches!(
            service.consume(&stale).await,
            Err(AuthError::MagicLinkInvalid)
        ));
    }

    #[test]
    fn test_link_url() {
        let service = test_service();
        let url = service.link_url("abc123");
        assert_eq!(url, "http://localhost:3000/auth/verify?token=abc123");
    }
}
