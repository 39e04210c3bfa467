//! Request extractors
//!
//! - [`AuthUser`]: the user behind a valid `Authorization: Bearer` access token
//! - [`ApiJson`]: JSON body whose rejections use the API error format
//! - [`BaseUrl`]: scheme and host used to build absolute media URLs

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::api::{ApiError, AppState};
use crate::auth::TokenType;

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
            })?;

        let token = value.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Authorization header must start with Bearer".to_string())
        })?;

        let claims = state.tokens.validate(token.trim(), TokenType::Access)?;
        Ok(AuthUser { id: claims.sub })
    }
}

/// `Json<T>` with rejections reported as validation errors
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    let text = rejection.body_text();
    match missing_field(&text) {
        Some(name) => ApiError::field(name, "This field is required."),
        None => ApiError::Validation(text),
    }
}

/// Field name out of serde's "missing field `name`" message
fn missing_field(text: &str) -> Option<&str> {
    let rest = &text[text.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next().filter(|name| !name.is_empty())
}

/// Base URL of this server as seen by the client
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for BaseUrl {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(url) = &state.config.public_url {
            return Ok(BaseUrl(url.trim_end_matches('/').to_string()));
        }
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| state.config.addr());
        Ok(BaseUrl(format!("http://{host}")))
    }
}
