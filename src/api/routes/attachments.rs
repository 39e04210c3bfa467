//! Attachment Routes
//!
//! - GET /api/attachments/?task= - Attachments on visible tasks
//! - POST /api/attachments/ - Multipart upload with fields `file` and `task`

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::visible_project;
use crate::api::dto::{attachment_with_url, TaskFilter};
use crate::api::extract::{AuthUser, BaseUrl};
use crate::api::{ApiError, ApiResult, AppState};
use crate::models::Attachment;

/// GET /api/attachments/
pub async fn list_attachments(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Attachment>>> {
    let rows = state.db.attachments().list_visible(user.id, filter.task).await?;
    Ok(Json(
        rows.into_iter()
            .map(|a| attachment_with_url(a, &base))
            .collect(),
    ))
}

/// POST /api/attachments/
pub async fn upload_attachment(
    State(state): State<Arc<AppState>>,
    BaseUrl(base): BaseUrl,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut task: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let name = field.file_name().unwrap_or("attachment").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.body_text()))?;
                file = Some((name, bytes.to_vec()));
            }
            "task" => {
                task = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| ApiError::field("file", "No file was submitted."))?;
    let task_id: i64 = task
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ApiError::field("task", "This field is required."))?
        .parse()
        .map_err(|_| ApiError::field("task", "A valid integer is required."))?;

    let task = state.db.tasks().get(task_id).await?;
    visible_project(&state, task.project, user).await?;

    let stored = state.media.save("attachments", &file_name, &bytes).await?;
    let attachment = state.db.attachments().create(task.id, user.id, &stored).await?;
    tracing::info!(task_id = task.id, path = %stored, "Attachment uploaded");

    Ok((StatusCode::CREATED, Json(attachment_with_url(attachment, &base))))
}
