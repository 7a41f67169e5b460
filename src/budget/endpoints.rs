//! Route handlers for creating, listing, updating and deleting budgets, plus
//! the budget status report.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    budget::{
        db::{
            create_budget, delete_budget, get_budget, get_budget_statuses, get_budgets_for_user,
            update_budget,
        },
        models::{Budget, BudgetId, BudgetState, BudgetStatus, NewBudget, UpdateBudget},
    },
    timezone::local_date_today,
    user::UserID,
};

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct BudgetListParams {
    /// The acting user.
    pub user_id: UserID,
}

/// Query parameters for the budget status report.
#[derive(Debug, Deserialize)]
pub struct BudgetStatusParams {
    /// The acting user.
    pub user_id: UserID,
    /// The date whose containing period is reported on. Defaults to today in
    /// the server's timezone.
    pub date: Option<Date>,
}

/// A route handler for creating a new budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    if new_budget.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_budget.amount));
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = create_budget(new_budget, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// A route handler for listing a user's budgets.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
    Query(params): Query<BudgetListParams>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_for_user(params.user_id, &connection)?;

    Ok(Json(budgets))
}

/// A route handler for the budget status report: each budget compared
/// against the expenses recorded in its period containing the given date.
pub async fn get_budget_statuses_endpoint(
    State(state): State<BudgetState>,
    Query(params): Query<BudgetStatusParams>,
) -> Result<Json<Vec<BudgetStatus>>, Error> {
    let date = match params.date {
        Some(date) => date,
        None => local_date_today(&state.local_timezone)?,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let statuses = get_budget_statuses(params.user_id, date, &connection)?;

    Ok(Json(statuses))
}

/// A route handler for getting a budget by its database ID.
pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, &connection)?;

    Ok(Json(budget))
}

/// A route handler for updating a budget.
///
/// Absent fields keep their current value.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
    Json(update): Json<UpdateBudget>,
) -> Result<Json<Budget>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut budget = match get_budget(budget_id, &connection) {
        Ok(budget) => budget,
        Err(Error::NotFound) => return Err(Error::UpdateMissingBudget),
        Err(error) => return Err(error),
    };

    if let Some(amount) = update.amount {
        budget.amount = amount;
    }
    if let Some(period) = update.period {
        budget.period = period;
    }

    if budget.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(budget.amount));
    }

    update_budget(&budget, &connection)?;

    Ok(Json(budget))
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_budget(budget_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
