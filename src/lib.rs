//! Moneta is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording income and expense
//! transactions, organizing them into categories, setting per-category
//! budgets, and defining recurring transactions that the application
//! materializes into ordinary transactions once per eligible calendar date.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
pub mod budget;
pub mod category;
mod dashboard;
mod database_id;
pub mod db;
pub mod endpoints;
mod logging;
mod pagination;
pub mod recurring;
mod routing;
mod timezone;
pub mod transaction;
pub mod user;

pub use app_state::AppState;
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::local_date_today;

use crate::category::CategoryId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used for a user's name.
    #[error("user name cannot be empty")]
    EmptyUserName,

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The category ID did not match a category that the acting user can see.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The user ID did not match a valid user.
    #[error("the user ID does not refer to a valid user")]
    InvalidUser,

    /// A zero or negative amount was supplied.
    ///
    /// Amounts are always positive, the transaction type records whether
    /// money came in or went out.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(f64),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A weekly recurring transaction was submitted without a day of the week.
    #[error("weekly recurring transactions require a day of the week")]
    MissingDayOfWeek,

    /// The day of the week is outside the range 0 (Sunday) to 6 (Saturday).
    #[error("{0} is not a valid day of the week, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidDayOfWeek(u8),

    /// A monthly recurring transaction was submitted without a day of the month.
    #[error("monthly recurring transactions require a day of the month")]
    MissingDayOfMonth,

    /// The day of the month is outside the range 1 to 31.
    #[error("{0} is not a valid day of the month, expected 1 to 31")]
    InvalidDayOfMonth(u8),

    /// The end date falls before the start date.
    #[error("the end date {end} is before the start date {start}")]
    InvalidDateRange {
        /// The first eligible date.
        start: Date,
        /// The offending last eligible date.
        end: Date,
    },

    /// A budget already exists for the same user, category and period.
    #[error("a budget for this category and period already exists")]
    DuplicateBudget,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a recurring transaction that does not exist
    #[error("tried to update a recurring transaction that is not in the database")]
    UpdateMissingRecurringTransaction,

    /// Tried to delete a recurring transaction that does not exist
    #[error("tried to delete a recurring transaction that is not in the database")]
    DeleteMissingRecurringTransaction,

    /// An error occurred while getting the local date from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("budget") =>
            {
                Error::DuplicateBudget
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::UpdateMissingRecurringTransaction
            | Error::DeleteMissingRecurringTransaction => StatusCode::NOT_FOUND,

            Error::DuplicateEmail | Error::DuplicateBudget => StatusCode::CONFLICT,

            Error::EmptyUserName
            | Error::EmptyCategoryName
            | Error::InvalidCategory(_)
            | Error::InvalidUser
            | Error::NonPositiveAmount(_)
            | Error::FutureDate(_)
            | Error::MissingDayOfWeek
            | Error::InvalidDayOfWeek(_)
            | Error::MissingDayOfMonth
            | Error::InvalidDayOfMonth(_)
            | Error::InvalidDateRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            Error::InvalidTimezone(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal errors are not intended to be shown to the client.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            Json(json!({ "error": "internal server error" }))
        } else {
            Json(json!({ "error": self.to_string() }))
        };

        (status, body).into_response()
    }
}
