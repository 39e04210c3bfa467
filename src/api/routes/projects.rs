//! Project Routes
//!
//! - GET /api/projects/?type= - Projects the caller owns or belongs to
//! - POST /api/projects/ - Create
//! - GET /api/projects/:id/ - Detail
//! - PUT /api/projects/:id/ - Replace (owner only)
//! - PATCH /api/projects/:id/ - Partial update (owner only)
//! - DELETE /api/projects/:id/ - Delete with tasks, expenses and members (owner only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{check_description, clean_title, owned_project, visible_project};
use crate::api::dto::ProjectListQuery;
use crate::api::extract::{ApiJson, AuthUser};
use crate::api::{ApiResult, AppState};
use crate::models::{Project, ProjectInput, ProjectPatch};

/// GET /api/projects/
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .db
        .projects()
        .list_visible(user.id, query.project_type)
        .await?;
    Ok(Json(projects))
}

/// POST /api/projects/
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(mut input): ApiJson<ProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    input.title = clean_title(&input.title)?;
    check_description(&input.description)?;

    let project = state.db.projects().create(user.id, &input).await?;
    state
        .db
        .activity()
        .record(
            user.id,
            Some(project.id),
            &project.title,
            &format!("Created project '{}'", project.title),
        )
        .await?;

    tracing::info!(project_id = project.id, user_id = user.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id/
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    visible_project(&state, id, user).await?;
    Ok(Json(state.db.projects().get(id).await?))
}

/// PUT /api/projects/:id/
pub async fn replace_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> ApiResult<Json<Project>> {
    apply_update(&state, user, id, input.into()).await
}

/// PATCH /api/projects/:id/
pub async fn patch_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    apply_update(&state, user, id, patch).await
}

async fn apply_update(
    state: &AppState,
    user: AuthUser,
    id: i64,
    mut patch: ProjectPatch,
) -> ApiResult<Json<Project>> {
    owned_project(state, id, user).await?;
    if let Some(title) = &patch.title {
        patch.title = Some(clean_title(title)?);
    }
    if let Some(description) = &patch.description {
        check_description(description)?;
    }

    let project = state.db.projects().update(id, &patch).await?;
    state
        .db
        .activity()
        .record(
            user.id,
            Some(project.id),
            &project.title,
            &format!("Updated project '{}'", project.title),
        )
        .await?;
    Ok(Json(project))
}

/// DELETE /api/projects/:id/
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    owned_project(&state, id, user).await?;

    let removed = state.db.projects().delete(id).await?;
    state
        .db
        .activity()
        .record(
            user.id,
            None,
            &removed.title,
            &format!("Deleted project '{}'", removed.title),
        )
        .await?;

    tracing::info!(project_id = id, user_id = user.id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}
