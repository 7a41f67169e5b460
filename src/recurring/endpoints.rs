//! Route handlers for managing recurring transactions and for triggering a
//! processing run.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::get_visible_category,
    recurring::{
        db::{
            create_recurring_transaction, delete_recurring_transaction,
            get_recurring_transaction, get_recurring_transactions_for_user,
            update_recurring_transaction,
        },
        models::{
            NewRecurringTransaction, RecurringState, RecurringTransaction,
            RecurringTransactionId, UpdateRecurringTransaction, validate_schedule,
        },
        processor::process_recurring_transactions,
    },
    timezone::local_date_today,
    user::UserID,
};

/// Query parameters for listing recurring transactions.
#[derive(Debug, Deserialize)]
pub struct RecurringListParams {
    /// The acting user.
    pub user_id: UserID,
}

/// The result of a processing run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// The number of transactions the run created.
    pub count: usize,
}

/// A route handler for creating a new recurring transaction.
pub async fn create_recurring_transaction_endpoint(
    State(state): State<RecurringState>,
    Json(new_recurring): Json<NewRecurringTransaction>,
) -> Result<(StatusCode, Json<RecurringTransaction>), Error> {
    validate_schedule(
        new_recurring.amount,
        new_recurring.frequency,
        new_recurring.start_date,
        new_recurring.end_date,
        new_recurring.day_of_week,
        new_recurring.day_of_month,
    )?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let recurring = create_recurring_transaction(new_recurring, &connection)?;

    Ok((StatusCode::CREATED, Json(recurring)))
}

/// A route handler for listing a user's recurring transactions, active and
/// inactive.
pub async fn get_recurring_transactions_endpoint(
    State(state): State<RecurringState>,
    Query(params): Query<RecurringListParams>,
) -> Result<Json<Vec<RecurringTransaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let definitions = get_recurring_transactions_for_user(params.user_id, &connection)?;

    Ok(Json(definitions))
}

/// A route handler for getting a recurring transaction by its database ID.
pub async fn get_recurring_transaction_endpoint(
    State(state): State<RecurringState>,
    Path(recurring_transaction_id): Path<RecurringTransactionId>,
) -> Result<Json<RecurringTransaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let recurring = get_recurring_transaction(recurring_transaction_id, &connection)?;

    Ok(Json(recurring))
}

/// A route handler for updating a recurring transaction.
///
/// Absent fields keep their current value. The merged definition is
/// validated as a whole, so e.g. switching the frequency to weekly requires
/// a `day_of_week` to be present (either already stored or in this payload).
pub async fn update_recurring_transaction_endpoint(
    State(state): State<RecurringState>,
    Path(recurring_transaction_id): Path<RecurringTransactionId>,
    Json(update): Json<UpdateRecurringTransaction>,
) -> Result<Json<RecurringTransaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut recurring = match get_recurring_transaction(recurring_transaction_id, &connection) {
        Ok(recurring) => recurring,
        Err(Error::NotFound) => return Err(Error::UpdateMissingRecurringTransaction),
        Err(error) => return Err(error),
    };

    if let Some(category_id) = update.category_id {
        recurring.category_id = category_id;
    }
    if let Some(transaction_type) = update.transaction_type {
        recurring.transaction_type = transaction_type;
    }
    if let Some(amount) = update.amount {
        recurring.amount = amount;
    }
    if let Some(description) = update.description {
        recurring.description = description;
    }
    if let Some(notes) = update.notes {
        recurring.notes = Some(notes);
    }
    if let Some(frequency) = update.frequency {
        recurring.frequency = frequency;
    }
    if let Some(start_date) = update.start_date {
        recurring.start_date = start_date;
    }
    if let Some(end_date) = update.end_date {
        recurring.end_date = Some(end_date);
    }
    if let Some(day_of_week) = update.day_of_week {
        recurring.day_of_week = Some(day_of_week);
    }
    if let Some(day_of_month) = update.day_of_month {
        recurring.day_of_month = Some(day_of_month);
    }
    if let Some(is_active) = update.is_active {
        recurring.is_active = is_active;
    }

    validate_schedule(
        recurring.amount,
        recurring.frequency,
        recurring.start_date,
        recurring.end_date,
        recurring.day_of_week,
        recurring.day_of_month,
    )?;

    get_visible_category(recurring.category_id, recurring.user_id, &connection)?;

    update_recurring_transaction(&recurring, &connection)?;

    Ok(Json(recurring))
}

/// A route handler for deleting a recurring transaction.
///
/// Transactions it previously materialized are not affected.
pub async fn delete_recurring_transaction_endpoint(
    State(state): State<RecurringState>,
    Path(recurring_transaction_id): Path<RecurringTransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_recurring_transaction(recurring_transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler that runs the recurring transaction processor for today
/// (in the server's configured timezone) and reports how many transactions
/// were created.
///
/// Safe to call any number of times per day, repeated runs create no
/// duplicates.
pub async fn process_recurring_transactions_endpoint(
    State(state): State<RecurringState>,
) -> Result<Json<ProcessingSummary>, Error> {
    let run_date = local_date_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = process_recurring_transactions(run_date, &connection)?;

    Ok(Json(ProcessingSummary { count }))
}
