//! Team Member Routes
//!
//! - GET /api/team-members/?project= - Memberships of visible projects
//! - POST /api/team-members/ - Add a user to a project (project owner)
//! - PATCH /api/team-members/:id/ - Change role (project owner)
//! - DELETE /api/team-members/:id/ - Remove (project owner)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{owned_project, writable_project};
use crate::api::dto::ProjectFilter;
use crate::api::extract::{ApiJson, AuthUser};
use crate::api::{ApiError, ApiResult, AppState};
use crate::models::{TeamMember, TeamMemberInput, TeamMemberPatch};
use crate::storage::StorageError;

/// GET /api/team-members/
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<TeamMember>>> {
    Ok(Json(
        state.db.team().list_visible(user.id, filter.project).await?,
    ))
}

/// POST /api/team-members/
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(input): ApiJson<TeamMemberInput>,
) -> ApiResult<(StatusCode, Json<TeamMember>)> {
    let access = writable_project(&state, input.project, user).await?;
    if !access.is_owner() {
        return Err(ApiError::forbidden());
    }

    let project = state.db.projects().get(input.project).await?;
    if input.user == user.id {
        return Err(ApiError::field("user", "The project owner is already on the team."));
    }
    match state.db.users().get(input.user).await {
        Ok(_) => {}
        Err(StorageError::NotFound { .. }) => {
            return Err(ApiError::field(
                "user",
                format!("Invalid pk \"{}\" - object does not exist.", input.user),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    let member = state
        .db
        .team()
        .add(input.project, input.user, input.role)
        .await?;
    state
        .db
        .activity()
        .record(
            user.id,
            Some(project.id),
            &project.title,
            &format!("Added {} to the team", member.user.username),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH /api/team-members/:id/
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<TeamMemberPatch>,
) -> ApiResult<Json<TeamMember>> {
    let member = state.db.team().get(id).await?;
    owned_project(&state, member.project, user).await?;
    Ok(Json(state.db.team().set_role(id, patch.role).await?))
}

/// DELETE /api/team-members/:id/
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let member = state.db.team().get(id).await?;
    owned_project(&state, member.project, user).await?;
    state.db.team().remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
