//! Expense Routes
//!
//! - GET /api/expenses/?project= - Expenses of visible projects, newest first
//! - POST /api/expenses/ - Create (date defaults to today)
//! - GET/PUT/PATCH/DELETE /api/expenses/:id/

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use std::sync::Arc;

use super::{visible_project, writable_project};
use crate::api::dto::ProjectFilter;
use crate::api::extract::{ApiJson, AuthUser};
use crate::api::{ApiError, ApiResult, AppState};
use crate::models::{Expense, ExpenseInput, ExpensePatch, Money};

fn check_amount(amount: Money) -> ApiResult<()> {
    if amount.is_negative() {
        return Err(ApiError::field(
            "amount",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if amount > Money::MAX_EXPENSE {
        return Err(ApiError::field(
            "amount",
            "Ensure that there are no more than 10 digits in total.",
        ));
    }
    Ok(())
}

/// GET /api/expenses/
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<Expense>>> {
    Ok(Json(
        state.db.expenses().list_visible(user.id, filter.project).await?,
    ))
}

/// POST /api/expenses/
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(input): ApiJson<ExpenseInput>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    writable_project(&state, input.project, user).await?;
    check_amount(input.amount)?;

    let today = Local::now().date_naive();
    let expense = state.db.expenses().create(&input, today).await?;
    let project = state.db.projects().get(expense.project).await?;
    let label = if expense.description.is_empty() {
        expense.category.to_string()
    } else {
        expense.description.clone()
    };
    state
        .db
        .activity()
        .record(
            user.id,
            Some(project.id),
            &project.title,
            &format!("Added expense '{}' ({})", label, expense.amount),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

async fn visible_expense(state: &AppState, user: AuthUser, id: i64) -> ApiResult<Expense> {
    let expense = state.db.expenses().get(id).await?;
    visible_project(state, expense.project, user).await?;
    Ok(expense)
}

/// GET /api/expenses/:id/
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Expense>> {
    Ok(Json(visible_expense(&state, user, id).await?))
}

/// PUT /api/expenses/:id/
pub async fn replace_expense(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<ExpenseInput>,
) -> ApiResult<Json<Expense>> {
    apply_update(&state, user, id, input.into()).await
}

/// PATCH /api/expenses/:id/
pub async fn patch_expense(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<ExpensePatch>,
) -> ApiResult<Json<Expense>> {
    apply_update(&state, user, id, patch).await
}

async fn apply_update(
    state: &AppState,
    user: AuthUser,
    id: i64,
    patch: ExpensePatch,
) -> ApiResult<Json<Expense>> {
    visible_expense(state, user, id).await?;
    if let Some(amount) = patch.amount {
        check_amount(amount)?;
    }
    Ok(Json(state.db.expenses().update(id, &patch).await?))
}

/// DELETE /api/expenses/:id/
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    visible_expense(&state, user, id).await?;
    state.db.expenses().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
