//! Activity Routes
//!
//! - GET /api/activity-logs/ - Feed for the caller, newest first (read-only)

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::extract::AuthUser;
use crate::api::{ApiResult, AppState};
use crate::models::ActivityLog;

/// GET /api/activity-logs/
pub async fn list_activity(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    Ok(Json(state.db.activity().list_visible(user.id).await?))
}
