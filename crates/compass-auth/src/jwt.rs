//! JWT Token Service
//!
//! Access tokens only. Tokens are issued after a magic link is verified and
//! carry the user ID and email.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{IssuedToken, TokenClaims};

/// JWT service for token management
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: exp.timestamp(),
            expires_in: self.config.access_token_lifetime.as_secs(),
        })
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Extract user ID from token without full validation.
    /// Used for logging when the token might be invalid.
    pub fn extract_user_id(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims::<&str>(&[]);
        validation.iss = None;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .ok()
            .and_then(|data| Uuid::parse_str(&data.claims.sub).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            access_token_lifetime: std::time::Duration::from_secs(30 * 60),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
        }
    }

    #[test]
    fn test_generate_and_validate() {
        let service = JwtService::new(test_config());
        let user_id = Uuid::new_v4();

        let issued = service
            .generate_access_token(user_id, "test@example.com")
            .unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 30 * 60);

        let claims = service.validate_access_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
    }

    #[test]
    fn test_expired_token() {
        let config = test_config();
        let service = JwtService::new(config.clone());

        // Hand-roll a token whose exp is in the past
        let now = Utc::now();
        let claims = TokenClaims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            nbf: (now - Duration::hours(2)).timestamp(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let result = service.validate_access_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::new(test_config());
        let mut other_config = test_config();
        other_config.secret = "another-secret-key-that-is-32-bytes!".to_string();
        let other = JwtService::new(other_config);

        let issued = other
            .generate_access_token(Uuid::new_v4(), "test@example.com")
            .unwrap();

        let result = service.validate_access_token(&issued.token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_extract_user_id() {
        let service = JwtService::new(test_config());
        let user_id = Uuid::new_v4();

        let issued = service
            .generate_access_token(user_id, "test@example.com")
            .unwrap();

        assert_eq!(service.extract_user_id(&issued.token), Some(user_id));
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new(test_config());
        let result = service.validate_access_token("invalid-token");
        assert!(result.is_err());
    }
}
