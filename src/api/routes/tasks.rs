//! Task Routes
//!
//! - GET /api/tasks/?project= - Tasks of visible projects
//! - POST /api/tasks/ - Create (owner or member of the project)
//! - GET/PUT/PATCH/DELETE /api/tasks/:id/
//!
//! Moving a task to Done appends "Completed task '<title>'" to the activity log.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{check_description, clean_title, visible_project, writable_project};
use crate::api::dto::{task_with_urls, ProjectFilter};
use crate::api::extract::{ApiJson, AuthUser, BaseUrl};
use crate::api::{ApiResult, AppState};
use crate::models::{Task, TaskInput, TaskPatch};

/// GET /api/tasks/
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.db.tasks().list_visible(user.id, filter.project).await?;
    Ok(Json(
        tasks.into_iter().map(|t| task_with_urls(t, &base)).collect(),
    ))
}

/// POST /api/tasks/
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    ApiJson(mut input): ApiJson<TaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    writable_project(&state, input.project, user).await?;
    input.title = clean_title(&input.title)?;
    check_description(&input.description)?;

    let task = state.db.tasks().create(&input).await?;
    let project = state.db.projects().get(task.project).await?;
    state
        .db
        .activity()
        .record(
            user.id,
            Some(project.id),
            &project.title,
            &format!("Created task '{}'", task.title),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task_with_urls(task, &base))))
}

/// GET /api/tasks/:id/
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = state.db.tasks().get(id).await?;
    visible_project(&state, task.project, user).await?;
    Ok(Json(task_with_urls(task, &base)))
}

/// PUT /api/tasks/:id/
pub async fn replace_task(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<TaskInput>,
) -> ApiResult<Json<Task>> {
    apply_update(&state, &base, user, id, input.into()).await
}

/// PATCH /api/tasks/:id/
pub async fn patch_task(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    apply_update(&state, &base, user, id, patch).await
}

async fn apply_update(
    state: &AppState,
    base: &str,
    user: AuthUser,
    id: i64,
    mut patch: TaskPatch,
) -> ApiResult<Json<Task>> {
    let current = state.db.tasks().get(id).await?;
    visible_project(state, current.project, user).await?;

    if let Some(title) = &patch.title {
        patch.title = Some(clean_title(title)?);
    }
    if let Some(description) = &patch.description {
        check_description(description)?;
    }

    let (before, after) = state.db.tasks().update(id, &patch).await?;
    if !before.status.is_done() && after.status.is_done() {
        let project = state.db.projects().get(after.project).await?;
        state
            .db
            .activity()
            .record(
                user.id,
                Some(project.id),
                &project.title,
                &format!("Completed task '{}'", after.title),
            )
            .await?;
        tracing::info!(task_id = id, user_id = user.id, "Task completed");
    }

    Ok(Json(task_with_urls(after, base)))
}

/// DELETE /api/tasks/:id/
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let task = state.db.tasks().get(id).await?;
    visible_project(&state, task.project, user).await?;
    state.db.tasks().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
