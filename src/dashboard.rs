//! The dashboard summary: income/expense totals and a per-category expense
//! breakdown over a date range.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    category::{CategoryId, get_categories_for_user},
    transaction::{SortOrder, Transaction, TransactionQuery, TransactionType, query_transactions},
    user::UserID,
};

/// The state needed for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for the dashboard summary.
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// The acting user.
    pub user_id: UserID,
    /// Include only transactions on or after this date.
    pub start_date: Option<Date>,
    /// Include only transactions on or before this date.
    pub end_date: Option<Date>,
}

/// Income/expense totals and a per-category expense breakdown.
#[derive(Debug, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The sum of income transactions in the range.
    pub income: f64,
    /// The sum of expense transactions in the range.
    pub expenses: f64,
    /// Income minus expenses.
    pub net: f64,
    /// Expense totals grouped by category, largest first.
    pub expenses_by_category: Vec<CategoryTotal>,
}

/// The expense total for one category.
#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category's ID.
    pub category_id: CategoryId,
    /// The category's display name.
    pub category_name: String,
    /// The sum of expense transactions in this category.
    pub total: f64,
}

/// A route handler for the dashboard summary.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardSummary>, Error> {
    let date_range = match (params.start_date, params.end_date) {
        (Some(start), Some(end)) if start > end => {
            return Err(Error::InvalidDateRange { start, end });
        }
        (Some(start), Some(end)) => Some(start..=end),
        (Some(start), None) => Some(start..=Date::MAX),
        (None, Some(end)) => Some(Date::MIN..=end),
        (None, None) => None,
    };

    let query = TransactionQuery {
        user_id: params.user_id,
        date_range,
        transaction_type: None,
        category_id: None,
        sort_date: Some(SortOrder::Ascending),
        limit: None,
        offset: 0,
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = query_transactions(&query, &connection)?;

    let category_names: HashMap<CategoryId, String> =
        get_categories_for_user(params.user_id, &connection)?
            .into_iter()
            .map(|category| (category.id, category.name.to_string()))
            .collect();

    Ok(Json(summarize(&transactions, &category_names)))
}

/// Aggregates transactions into the dashboard summary.
fn summarize(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> DashboardSummary {
    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut expense_totals: HashMap<CategoryId, f64> = HashMap::new();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => income += transaction.amount,
            TransactionType::Expense => {
                expenses += transaction.amount;
                *expense_totals.entry(transaction.category_id).or_insert(0.0) +=
                    transaction.amount;
            }
        }
    }

    let mut expenses_by_category: Vec<CategoryTotal> = expense_totals
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_id,
            category_name: category_names
                .get(&category_id)
                .cloned()
                .unwrap_or_else(|| format!("Category {category_id}")),
            total,
        })
        .collect();

    expenses_by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

    DashboardSummary {
        net: income - expenses,
        income,
        expenses,
        expenses_by_category,
    }
}

#[cfg(test)]
mod dashboard_tests {
    use std::collections::HashMap;

    use time::{Date, Month};

    use crate::{
        transaction::{Transaction, TransactionType},
        user::UserID,
    };

    use super::summarize;

    fn transaction(
        transaction_type: TransactionType,
        amount: f64,
        category_id: i64,
    ) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            transaction_type,
            amount,
            date: Date::from_calendar_date(2024, Month::June, 1).unwrap(),
            description: String::new(),
            category_id,
            notes: None,
        }
    }

    #[test]
    fn summarize_totals_income_and_expenses() {
        let transactions = [
            transaction(TransactionType::Income, 1000.0, 1),
            transaction(TransactionType::Expense, 300.0, 2),
            transaction(TransactionType::Expense, 200.0, 2),
        ];

        let summary = summarize(&transactions, &HashMap::new());

        assert_eq!(summary.income, 1000.0);
        assert_eq!(summary.expenses, 500.0);
        assert_eq!(summary.net, 500.0);
    }

    #[test]
    fn summarize_groups_expenses_by_category_largest_first() {
        let transactions = [
            transaction(TransactionType::Expense, 50.0, 1),
            transaction(TransactionType::Expense, 300.0, 2),
            transaction(TransactionType::Expense, 25.0, 1),
        ];
        let names = HashMap::from([(1, "Coffee".to_string()), (2, "Rent".to_string())]);

        let summary = summarize(&transactions, &names);

        assert_eq!(summary.expenses_by_category.len(), 2);
        assert_eq!(summary.expenses_by_category[0].category_name, "Rent");
        assert_eq!(summary.expenses_by_category[0].total, 300.0);
        assert_eq!(summary.expenses_by_category[1].category_name, "Coffee");
        assert_eq!(summary.expenses_by_category[1].total, 75.0);
    }

    #[test]
    fn summarize_income_does_not_appear_in_category_breakdown() {
        let transactions = [transaction(TransactionType::Income, 1000.0, 1)];

        let summary = summarize(&transactions, &HashMap::new());

        assert!(summary.expenses_by_category.is_empty());
    }

    #[test]
    fn summarize_handles_no_transactions() {
        let summary = summarize(&[], &HashMap::new());

        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expenses, 0.0);
        assert_eq!(summary.net, 0.0);
        assert!(summary.expenses_by_category.is_empty());
    }
}
