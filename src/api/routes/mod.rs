//! API Routes
//!
//! Route handlers organized by resource, plus the visibility checks they
//! share.

pub mod activity;
pub mod attachments;
pub mod auth;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod team;
pub mod users;

use crate::api::extract::AuthUser;
use crate::api::{ApiError, ApiResult, AppState};
use crate::forms::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::storage::{ProjectAccess, StorageError};

/// Access of `user` to a project they must be able to see; outsiders get 404
pub(crate) async fn visible_project(
    state: &AppState,
    project_id: i64,
    user: AuthUser,
) -> ApiResult<ProjectAccess> {
    let access = state.db.projects().access(project_id, user.id).await?;
    if !access.can_view() {
        return Err(ApiError::Storage(StorageError::not_found("Project", project_id)));
    }
    Ok(access)
}

/// Like [`visible_project`], but for writes into a project named in a
/// request body, where outsiders get 403
pub(crate) async fn writable_project(
    state: &AppState,
    project_id: i64,
    user: AuthUser,
) -> ApiResult<ProjectAccess> {
    let access = match state.db.projects().access(project_id, user.id).await {
        Ok(access) => access,
        Err(StorageError::NotFound { .. }) => {
            return Err(ApiError::field("project", format!("Invalid pk \"{project_id}\" - object does not exist.")))
        }
        Err(e) => return Err(e.into()),
    };
    if !access.can_view() {
        return Err(ApiError::Forbidden(
            "You do not have permission to add to this project.".to_string(),
        ));
    }
    Ok(access)
}

/// Project owner only; members get 403, outsiders 404
pub(crate) async fn owned_project(state: &AppState, project_id: i64, user: AuthUser) -> ApiResult<()> {
    let access = visible_project(state, project_id, user).await?;
    if !access.is_owner() {
        return Err(ApiError::forbidden());
    }
    Ok(())
}

/// Trimmed, non-empty, at most 100 characters
pub(crate) fn clean_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::field("title", "This field may not be blank."));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::field(
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_LEN} characters."),
        ));
    }
    Ok(title.to_string())
}

pub(crate) fn check_description(description: &str) -> ApiResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::field(
            "description",
            format!("Ensure this field has no more than {MAX_DESCRIPTION_LEN} characters."),
        ));
    }
    Ok(())
}
