//! Core transaction domain types.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, DatabaseId, category::CategoryId, pagination::PaginationConfig, user::UserID};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// The error returned when a string is not a valid transaction type.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{0} is not a valid transaction type, expected \"income\" or \"expense\"")]
pub struct TransactionTypeError(pub String);

/// Whether a transaction brought money in or sent money out.
///
/// Amounts are always positive, the type carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g., wages.
    Income,
    /// Money going out, e.g., groceries.
    Expense,
}

impl TransactionType {
    /// The type as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = TransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(TransactionTypeError(other.to_string())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that the transaction belongs to.
    pub user_id: UserID,
    /// Whether this transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// The payload for creating a transaction.
///
/// The recurring transaction processor builds this same payload when it
/// materializes a recurring transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// Whether this transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// Optional free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// The payload for updating a transaction. Every updatable field is listed
/// explicitly, fields that are absent keep their current value.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTransaction {
    /// The new transaction type.
    pub transaction_type: Option<TransactionType>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new date.
    pub date: Option<Date>,
    /// The new description.
    pub description: Option<String>,
    /// The new category.
    pub category_id: Option<CategoryId>,
    /// The new notes. Notes can be replaced but not cleared through this
    /// payload.
    pub notes: Option<String>,
}

/// Unified state for all transaction-related operations.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The config that controls how to page listings.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
