//! Authentication Routes
//!
//! - POST /api/register/ - Create an account
//! - POST /api/token/ - Exchange username/password for a token pair
//! - POST /api/token/refresh/ - Rotate a refresh token into a new pair

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::user_with_urls;
use crate::api::extract::{ApiJson, BaseUrl};
use crate::api::{ApiError, ApiResult, AppState};
use crate::auth::{hash_password, verify_password, TokenType};
use crate::forms::is_valid_email;
use crate::models::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User};
use crate::storage::StorageError;

const MAX_USERNAME_LEN: usize = 150;

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// POST /api/register/
pub async fn register(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let username = req.username.trim();
    let email = req.email.trim();

    let mut errors = BTreeMap::new();
    if username.is_empty() {
        errors.insert("username".to_string(), "This field may not be blank.".to_string());
    } else if username.chars().count() > MAX_USERNAME_LEN || !valid_username(username) {
        errors.insert(
            "username".to_string(),
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    if email.is_empty() {
        errors.insert("email".to_string(), "This field may not be blank.".to_string());
    } else if !is_valid_email(email) {
        errors.insert("email".to_string(), "Enter a valid email address.".to_string());
    }
    if req.password.is_empty() {
        errors.insert("password".to_string(), "This field may not be blank.".to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Fields(errors));
    }

    let hash = hash_password(&req.password)?;
    let user = match state.db.users().create(username, email, &hash).await {
        Ok(user) => user,
        Err(StorageError::Conflict(msg)) => return Err(ApiError::field("username", msg)),
        Err(e) => return Err(e.into()),
    };

    Ok((StatusCode::CREATED, Json(user_with_urls(user, &base))))
}

/// POST /api/token/
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let invalid =
        || ApiError::Unauthorized("No active account found with the given credentials".to_string());

    let creds = state
        .db
        .users()
        .credentials(req.username.trim())
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &creds.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(invalid());
    }

    Ok(Json(state.tokens.issue_pair(creds.user_id)?))
}

/// POST /api/token/refresh/
///
/// The presented refresh token is revoked and a fresh pair returned, so each
/// refresh token works once.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state.tokens.validate(&req.refresh, TokenType::Refresh)?;

    let tokens = state.db.tokens();
    if !tokens.revoke(&claims.jti, claims.exp).await? {
        tracing::warn!(user_id = claims.sub, "Reused refresh token rejected");
        return Err(ApiError::Unauthorized("Token is blacklisted".to_string()));
    }
    let purged = tokens.purge_expired(Utc::now().timestamp()).await?;
    if purged > 0 {
        tracing::debug!(purged, "Dropped expired token revocations");
    }

    Ok(Json(state.tokens.issue_pair(claims.sub)?))
}
