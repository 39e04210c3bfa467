//! Session bootstrapping
//!
//! Protected pages run [`AuthGuard::check`] before loading. The access token's
//! expiry is read locally without checking the signature; the server still
//! verifies every request.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::client::{ClientError, DashboardApi, StoredTokens, TokenStore};
use crate::forms::{FormError, RegisterForm};
use crate::models::{LoginRequest, User};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Malformed token: {0}")]
    MalformedToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token expiry out of range")]
    BadExpiry,

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Token store error: {0}")]
    Store(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Expiry of a JWT, read without verifying its signature
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Utc.timestamp_opt(data.claims.exp, 0)
        .single()
        .ok_or(SessionError::BadExpiry)
}

/// Outcome of a session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authorized,
    Unauthorized,
}

/// Gate in front of protected pages
pub struct AuthGuard {
    tokens: Arc<dyn TokenStore>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }

    pub async fn check<A>(&self, api: &A) -> AuthStatus
    where
        A: DashboardApi + ?Sized,
    {
        self.check_at(api, Utc::now()).await
    }

    /// Check against a given clock; an expired access token is traded for a
    /// new pair when a refresh token is available
    pub async fn check_at<A>(&self, api: &A, now: DateTime<Utc>) -> AuthStatus
    where
        A: DashboardApi + ?Sized,
    {
        let stored = self.tokens.load();
        let Some(access) = stored.access else {
            return AuthStatus::Unauthorized;
        };

        let expiry = match decode_expiry(&access) {
            Ok(expiry) => expiry,
            Err(e) => {
                tracing::warn!("Discarding unreadable access token: {}", e);
                return AuthStatus::Unauthorized;
            }
        };
        if expiry >= now {
            return AuthStatus::Authorized;
        }

        let Some(refresh) = stored.refresh else {
            return AuthStatus::Unauthorized;
        };
        match api.refresh_tokens(&refresh).await {
            Ok(pair) => match self.tokens.save(&StoredTokens::from(pair)) {
                Ok(()) => {
                    tracing::debug!("Access token refreshed");
                    AuthStatus::Authorized
                }
                Err(e) => {
                    tracing::error!("Failed to store refreshed tokens: {}", e);
                    AuthStatus::Unauthorized
                }
            },
            Err(e) => {
                tracing::info!("Token refresh failed: {}", e);
                AuthStatus::Unauthorized
            }
        }
    }
}

/// Exchange credentials for a token pair and store it
pub async fn login<A>(api: &A, tokens: &dyn TokenStore, req: &LoginRequest) -> Result<(), SessionError>
where
    A: DashboardApi + ?Sized,
{
    let pair = api.obtain_tokens(req).await?;
    tokens.save(&StoredTokens::from(pair))?;
    tracing::info!(username = %req.username, "Logged in");
    Ok(())
}

/// Forget both tokens
pub fn logout(tokens: &dyn TokenStore) -> Result<(), SessionError> {
    tokens.clear()?;
    Ok(())
}

/// Validate the sign-up form and create the account; any stored tokens are
/// dropped first so the new user starts logged out
pub async fn register<A>(
    api: &A,
    tokens: &dyn TokenStore,
    form: &RegisterForm,
) -> Result<User, SessionError>
where
    A: DashboardApi + ?Sized,
{
    let req = form.validate()?;
    tokens.clear()?;
    Ok(api.register(&req).await?)
}
