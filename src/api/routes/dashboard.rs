//! Dashboard Routes
//!
//! - GET /api/dashboard-stats/ - Home page counters for the caller

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::extract::AuthUser;
use crate::api::{ApiResult, AppState};
use crate::models::DashboardStats;

/// GET /api/dashboard-stats/
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.projects().dashboard_stats(user.id).await?))
}
