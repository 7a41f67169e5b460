//! Transactions record money coming in or going out on a calendar date.
//! They are created directly through the REST API or materialized from
//! recurring transactions by the processor.

mod db;
mod endpoints;
mod models;
mod query;

pub use db::{
    create_transaction, create_transaction_table, count_transactions, delete_transaction,
    get_transaction, query_transactions,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use models::{NewTransaction, Transaction, TransactionId, TransactionType, UpdateTransaction};
pub use query::{SortOrder, TransactionQuery};
