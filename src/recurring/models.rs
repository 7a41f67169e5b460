//! Core recurring transaction domain types.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, DatabaseId, Error, category::CategoryId, transaction::TransactionType, user::UserID,
};

/// Database identifier for a recurring transaction.
pub type RecurringTransactionId = DatabaseId;

/// The error returned when a string is not a valid frequency.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{0} is not a valid frequency, expected \"daily\", \"weekly\", \"monthly\" or \"yearly\"")]
pub struct FrequencyError(pub String);

/// How often a recurring transaction happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Once a week, on the definition's day of the week.
    Weekly,
    /// Once a month, on the definition's day of the month. Months shorter
    /// than the configured day are skipped.
    Monthly,
    /// Once a year, on the month and day of the definition's start date.
    Yearly,
}

impl Frequency {
    /// The frequency as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(FrequencyError(other.to_string())),
        }
    }
}

/// A transaction (income or expense) that repeats on a regular basis (e.g.,
/// wages, rent, a phone bill).
///
/// The processor materializes a concrete [Transaction](crate::transaction::Transaction)
/// from this definition at most once per eligible calendar date, and records
/// the most recent materialization in `last_processed_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    /// The ID of the recurring transaction.
    pub id: RecurringTransactionId,
    /// The user the recurring transaction belongs to.
    pub user_id: UserID,
    /// The category that materialized transactions are filed under.
    pub category_id: CategoryId,
    /// Whether materialized transactions are income or expenses.
    pub transaction_type: TransactionType,
    /// The amount of each materialized transaction.
    pub amount: f64,
    /// The description copied onto each materialized transaction.
    pub description: String,
    /// Optional notes copied onto each materialized transaction.
    pub notes: Option<String>,
    /// How often the transaction repeats.
    pub frequency: Frequency,
    /// The first date the schedule is eligible (inclusive).
    pub start_date: Date,
    /// The last date the schedule is eligible (inclusive), or `None` to
    /// recur indefinitely.
    pub end_date: Option<Date>,
    /// The scheduled weekday, 0 (Sunday) to 6 (Saturday). Only meaningful
    /// when `frequency` is weekly.
    pub day_of_week: Option<u8>,
    /// The scheduled day of the month, 1 to 31. Only meaningful when
    /// `frequency` is monthly.
    pub day_of_month: Option<u8>,
    /// The date of the most recent successful materialization. Mutated only
    /// by the processor.
    pub last_processed_date: Option<Date>,
    /// Inactive definitions are skipped entirely by the processor.
    pub is_active: bool,
}

/// The payload for creating a recurring transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecurringTransaction {
    /// The user the recurring transaction belongs to.
    pub user_id: UserID,
    /// The category that materialized transactions are filed under.
    pub category_id: CategoryId,
    /// Whether materialized transactions are income or expenses.
    pub transaction_type: TransactionType,
    /// The amount of each materialized transaction.
    pub amount: f64,
    /// The description copied onto each materialized transaction.
    pub description: String,
    /// Optional notes copied onto each materialized transaction.
    #[serde(default)]
    pub notes: Option<String>,
    /// How often the transaction repeats.
    pub frequency: Frequency,
    /// The first date the schedule is eligible (inclusive).
    pub start_date: Date,
    /// The last date the schedule is eligible (inclusive).
    #[serde(default)]
    pub end_date: Option<Date>,
    /// The scheduled weekday, 0 (Sunday) to 6 (Saturday). Required when
    /// `frequency` is weekly.
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// The scheduled day of the month, 1 to 31. Required when `frequency` is
    /// monthly.
    #[serde(default)]
    pub day_of_month: Option<u8>,
    /// Whether the schedule starts out active. Defaults to true.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// The payload for updating a recurring transaction. Every updatable field is
/// listed explicitly, fields that are absent keep their current value.
///
/// `last_processed_date` is deliberately not updatable, it belongs to the
/// processor.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateRecurringTransaction {
    /// The new category.
    pub category_id: Option<CategoryId>,
    /// The new transaction type.
    pub transaction_type: Option<TransactionType>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new description.
    pub description: Option<String>,
    /// The new notes. Notes can be replaced but not cleared through this
    /// payload.
    pub notes: Option<String>,
    /// The new frequency.
    pub frequency: Option<Frequency>,
    /// The new start date.
    pub start_date: Option<Date>,
    /// The new end date.
    pub end_date: Option<Date>,
    /// The new scheduled weekday.
    pub day_of_week: Option<u8>,
    /// The new scheduled day of the month.
    pub day_of_month: Option<u8>,
    /// Whether the schedule is active.
    pub is_active: Option<bool>,
}

/// Check the schedule fields a client submitted for a recurring transaction.
///
/// This runs at the REST boundary so that malformed definitions are rejected
/// before they are stored. The schedule evaluator itself never errors, a
/// malformed definition that somehow reaches it simply never matches.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if `amount` is zero or negative,
/// - [Error::InvalidDateRange] if `end_date` is before `start_date`,
/// - [Error::MissingDayOfWeek]/[Error::InvalidDayOfWeek] if `frequency` is
///   weekly and `day_of_week` is absent or out of range,
/// - [Error::MissingDayOfMonth]/[Error::InvalidDayOfMonth] if `frequency` is
///   monthly and `day_of_month` is absent or out of range.
pub(super) fn validate_schedule(
    amount: f64,
    frequency: Frequency,
    start_date: Date,
    end_date: Option<Date>,
    day_of_week: Option<u8>,
    day_of_month: Option<u8>,
) -> Result<(), Error> {
    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount(amount));
    }

    if let Some(end_date) = end_date
        && end_date < start_date
    {
        return Err(Error::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    if let Some(day_of_week) = day_of_week
        && day_of_week > 6
    {
        return Err(Error::InvalidDayOfWeek(day_of_week));
    }

    if let Some(day_of_month) = day_of_month
        && !(1..=31).contains(&day_of_month)
    {
        return Err(Error::InvalidDayOfMonth(day_of_month));
    }

    match frequency {
        Frequency::Weekly if day_of_week.is_none() => Err(Error::MissingDayOfWeek),
        Frequency::Monthly if day_of_month.is_none() => Err(Error::MissingDayOfMonth),
        _ => Ok(()),
    }
}

/// Unified state for all recurring transaction operations.
#[derive(Debug, Clone)]
pub struct RecurringState {
    /// The database connection for managing recurring transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
