//! Core budget domain types.

use std::{
    fmt::Display,
    ops::RangeInclusive,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{AppState, DatabaseId, category::CategoryId, user::UserID};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// The error returned when a string is not a valid budget period.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{0} is not a valid budget period, expected \"weekly\", \"monthly\" or \"yearly\"")]
pub struct BudgetPeriodError(pub String);

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// A calendar week, Monday through Sunday.
    Weekly,
    /// A calendar month of variable length.
    Monthly,
    /// A calendar year.
    Yearly,
}

impl BudgetPeriod {
    /// The period as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// The calendar window of this period that contains `date` (inclusive on
    /// both ends).
    pub fn range_containing(&self, date: Date) -> RangeInclusive<Date> {
        match self {
            BudgetPeriod::Weekly => {
                let days_from_monday = date.weekday().number_days_from_monday();
                let start = date - Duration::days(days_from_monday as i64);
                start..=start + Duration::days(6)
            }
            BudgetPeriod::Monthly => {
                let start = date.replace_day(1).unwrap();
                let last_day = time::util::days_in_year_month(date.year(), date.month());
                start..=date.replace_day(last_day).unwrap()
            }
            BudgetPeriod::Yearly => {
                let start = Date::from_calendar_date(date.year(), time::Month::January, 1).unwrap();
                let end = Date::from_calendar_date(date.year(), time::Month::December, 31).unwrap();
                start..=end
            }
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = BudgetPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(BudgetPeriodError(other.to_string())),
        }
    }
}

/// A spending limit for one category over a repeating period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The spending limit for one period.
    pub amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
}

/// The payload for creating a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewBudget {
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The spending limit for one period.
    pub amount: f64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
}

/// The payload for updating a budget. Every updatable field is listed
/// explicitly, fields that are absent keep their current value.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBudget {
    /// The new spending limit.
    pub amount: Option<f64>,
    /// The new period.
    pub period: Option<BudgetPeriod>,
}

/// A budget compared against the spending recorded in the period containing
/// a reference date.
#[derive(Debug, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// The budget being reported on.
    pub budget: Budget,
    /// The first day of the reported period.
    pub period_start: Date,
    /// The last day of the reported period.
    pub period_end: Date,
    /// The total of expense transactions in the budget's category within the
    /// period.
    pub spent: f64,
    /// The limit minus the spending. Negative when the budget is exceeded.
    pub remaining: f64,
}

/// Unified state for all budget-related operations.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
