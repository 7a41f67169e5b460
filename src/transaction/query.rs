//! Defines how transactions are fetched from the database.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    category::CategoryId,
    transaction::models::TransactionType,
    user::UserID,
};

/// Defines which transactions should be fetched by
/// [query_transactions](crate::transaction::query_transactions).
pub struct TransactionQuery {
    /// Include only transactions belonging to this user.
    pub user_id: UserID,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only income or only expense transactions.
    pub transaction_type: Option<TransactionType>,
    /// Include only transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first `offset` transactions. Only applied when `limit` is
    /// set.
    pub offset: u64,
}

impl TransactionQuery {
    /// A query that selects all of a user's transactions in storage order.
    pub fn for_user(user_id: UserID) -> Self {
        Self {
            user_id,
            date_range: None,
            transaction_type: None,
            category_id: None,
            sort_date: None,
            limit: None,
            offset: 0,
        }
    }
}

/// The order to sort transactions in a [TransactionQuery].
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
