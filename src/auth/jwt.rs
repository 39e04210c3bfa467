//! JWT token generation and validation
//!
//! Tokens are signed with HS256. Every token carries a random `jti`; the
//! refresh endpoint revokes the `jti` of the refresh token it consumed so a
//! rotated token cannot be replayed.
//!
//! # Token Types
//!
//! - **Access Token**: short-lived (60 minutes by default), sent as `Authorization: Bearer`
//! - **Refresh Token**: longer-lived (1 day by default), exchanged for a new pair

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::TokenPair;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer or format check failed
    #[error("Token is invalid: {0}")]
    Invalid(String),

    /// An access token was presented where a refresh token is expected, or the reverse
    #[error("Expected {expected} token")]
    WrongType { expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    /// Unique token id, used for refresh revocation
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    pub fn new(user_id: i64, issuer: &str, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        }
    }
}

/// Signs and validates tokens with one secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            issuer: config.issuer.clone(),
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::hours(config.refresh_token_hours),
        }
    }

    pub fn claims(&self, user_id: i64, token_type: TokenType) -> Claims {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        Claims::new(user_id, &self.issuer, token_type, ttl)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key)
            .map_err(|e| JwtError::Create(e.to_string()))
    }

    /// Fresh access/refresh pair for a user
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.encode(&self.claims(user_id, TokenType::Access))?,
            refresh: self.encode(&self.claims(user_id, TokenType::Refresh))?,
        })
    }

    /// Verify signature, issuer, expiry and token type
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_nbf = true;

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected: expected.as_str(),
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_pair_round_trip() {
        let issuer = issuer();
        let pair = issuer.issue_pair(7).unwrap();

        let access = issuer.validate(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.sub, 7);
        assert_eq!(access.exp - access.iat, 60 * 60);

        let refresh = issuer.validate(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 24 * 60 * 60);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let issuer = issuer();
        let pair = issuer.issue_pair(7).unwrap();
        assert!(matches!(
            issuer.validate(&pair.access, TokenType::Refresh),
            Err(JwtError::WrongType { expected: "refresh" })
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let claims = Claims::new(7, "goproject", TokenType::Access, Duration::hours(-2));
        let token = issuer.encode(&claims).unwrap();
        assert!(matches!(
            issuer.validate(&token, TokenType::Access),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issuer().issue_pair(1).unwrap().access;
        let other = TokenIssuer::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret-value".to_string(),
            ..AuthConfig::default()
        });
        assert!(matches!(
            other.validate(&token, TokenType::Access),
            Err(JwtError::Invalid(_))
        ));
    }
}
