//! Route handlers for creating, listing, updating and deleting transactions.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::{CategoryId, get_visible_category},
    pagination::{PageParams, Paginated},
    timezone::local_date_today,
    transaction::{
        db::{
            count_transactions, create_transaction, delete_transaction, get_transaction,
            query_transactions, update_transaction,
        },
        models::{
            NewTransaction, Transaction, TransactionId, TransactionState, TransactionType,
            UpdateTransaction,
        },
        query::{SortOrder, TransactionQuery},
    },
    user::UserID,
};

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    /// The acting user.
    pub user_id: UserID,
    /// Include only transactions on or after this date.
    pub start_date: Option<Date>,
    /// Include only transactions on or before this date.
    pub end_date: Option<Date>,
    /// Include only income or only expense transactions.
    pub transaction_type: Option<TransactionType>,
    /// Include only transactions in this category.
    pub category_id: Option<CategoryId>,
    /// The 1-based page number to return.
    pub page: Option<u64>,
    /// The number of items per page.
    pub page_size: Option<u64>,
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    if new_transaction.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_transaction.amount));
    }

    let today = local_date_today(&state.local_timezone)?;
    if new_transaction.date > today {
        return Err(Error::FutureDate(new_transaction.date));
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(new_transaction, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for listing a user's transactions, most recent first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Paginated<Transaction>>, Error> {
    let date_range = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) if start > end => {
            return Err(Error::InvalidDateRange { start, end });
        }
        (Some(start), Some(end)) => Some(start..=end),
        (Some(start), None) => Some(start..=Date::MAX),
        (None, Some(end)) => Some(Date::MIN..=end),
        (None, None) => None,
    };

    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .resolve(&state.pagination_config);

    let query = TransactionQuery {
        user_id: params.user_id,
        date_range,
        transaction_type: params.transaction_type,
        category_id: params.category_id,
        sort_date: Some(SortOrder::Descending),
        limit: Some(page.page_size),
        offset: page.offset(),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = query_transactions(&query, &connection)?;
    let total_count = count_transactions(&query, &connection)?;

    Ok(Json(Paginated::new(transactions, page, total_count)))
}

/// A route handler for getting a transaction by its database ID.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for updating a transaction.
///
/// Absent fields keep their current value.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(update): Json<UpdateTransaction>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut transaction = match get_transaction(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };

    if let Some(transaction_type) = update.transaction_type {
        transaction.transaction_type = transaction_type;
    }
    if let Some(amount) = update.amount {
        transaction.amount = amount;
    }
    if let Some(date) = update.date {
        transaction.date = date;
    }
    if let Some(description) = update.description {
        transaction.description = description;
    }
    if let Some(category_id) = update.category_id {
        transaction.category_id = category_id;
    }
    if let Some(notes) = update.notes {
        transaction.notes = Some(notes);
    }

    if transaction.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(transaction.amount));
    }

    let today = local_date_today(&state.local_timezone)?;
    if transaction.date > today {
        return Err(Error::FutureDate(transaction.date));
    }

    get_visible_category(transaction.category_id, transaction.user_id, &connection)?;

    update_transaction(&transaction, &connection)?;

    Ok(Json(transaction))
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
