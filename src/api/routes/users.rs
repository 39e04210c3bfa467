//! User Routes
//!
//! - GET /api/users/ - Everyone, for the member picker
//! - GET /api/user/ - The caller
//! - PUT /api/user/update/ - Multipart profile update
//! - POST /api/change-password/ - Replace the caller's password

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::{user_with_urls, MessageResponse, ProfileUpdateResponse};
use crate::api::extract::{ApiJson, AuthUser, BaseUrl};
use crate::api::media::is_image;
use crate::api::{ApiError, ApiResult, AppState};
use crate::auth::{hash_password, verify_password};
use crate::forms::{is_valid_email, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};
use crate::models::{ChangePasswordRequest, ProfileRole, ProfileUpdate, User};

/// GET /api/users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    _user: AuthUser,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.db.users().list().await?;
    Ok(Json(
        users.into_iter().map(|u| user_with_urls(u, &base)).collect(),
    ))
}

/// GET /api/user/
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
) -> ApiResult<Json<User>> {
    let me = state.db.users().get(user.id).await?;
    Ok(Json(user_with_urls(me, &base)))
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::Validation(e.body_text())
}

/// PUT /api/user/update/
///
/// Multipart fields: username, email, role, course, bio, profile_picture (file).
/// Absent fields are left unchanged.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let mut update = ProfileUpdate::default();
    let mut picture: Option<(String, Vec<u8>)> = None;
    let mut errors = BTreeMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "profile_picture" {
            let file_name = field.file_name().unwrap_or("picture").to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if !bytes.is_empty() {
                picture = Some((file_name, bytes.to_vec()));
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "username" => update.username = Some(value.trim().to_string()),
            "email" => update.email = Some(value.trim().to_string()),
            "role" => match value.parse::<ProfileRole>() {
                Ok(role) => update.role = Some(role),
                Err(e) => {
                    errors.insert("role".to_string(), e.to_string());
                }
            },
            "course" => update.course = Some(value),
            "bio" => update.bio = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown profile field"),
        }
    }

    let me = state.db.users().get(user.id).await?;
    let users = state.db.users();

    if let Some(username) = update.username.as_deref().filter(|u| !u.is_empty()) {
        if username != me.username {
            if users.username_taken(username, user.id).await? {
                errors.insert("username".to_string(), "This username is already taken.".to_string());
            } else if username.chars().count() < MIN_USERNAME_LEN {
                errors.insert(
                    "username".to_string(),
                    "Username must be at least 3 characters long.".to_string(),
                );
            }
        }
    }
    if let Some(email) = update.email.as_deref().filter(|e| !e.is_empty()) {
        if email != me.email {
            if !is_valid_email(email) {
                errors.insert("email".to_string(), "Invalid email format.".to_string());
            } else if users.email_taken(email, user.id).await? {
                errors.insert("email".to_string(), "This email is already in use.".to_string());
            }
        }
    }
    if let Some((file_name, _)) = &picture {
        if !is_image(file_name) {
            errors.insert(
                "profile_picture".to_string(),
                "Upload a valid image.".to_string(),
            );
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Fields(errors));
    }

    let stored = match picture {
        Some((file_name, bytes)) => Some(state.media.save("profile_pics", &file_name, &bytes).await?),
        None => None,
    };
    let updated = users.update_profile(user.id, &update, stored.as_deref()).await?;
    tracing::info!(user_id = user.id, "Profile updated");

    let updated = user_with_urls(updated, &base);
    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        id: updated.id,
        username: updated.username,
        email: updated.email,
        profile: updated.profile,
    }))
}

/// POST /api/change-password/
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let users = state.db.users();
    let current = users.password_hash(user.id).await?;
    if !verify_password(&req.current_password, &current)? {
        return Err(ApiError::field(
            "current_password",
            "Current password is incorrect.",
        ));
    }
    if req.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::field(
            "new_password",
            "New password must be at least 8 characters long.",
        ));
    }

    users.set_password(user.id, &hash_password(&req.new_password)?).await?;
    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
