//! Recurring transactions describe income or expenses that repeat on a
//! regular schedule (e.g., wages, rent, a phone bill). The processor turns
//! them into ordinary transactions, at most once per eligible calendar date.

mod db;
mod endpoints;
mod models;
mod processor;
mod schedule;

pub use db::{
    create_recurring_transaction, create_recurring_transaction_table,
    delete_recurring_transaction, get_active_recurring_transactions, get_recurring_transaction,
    get_recurring_transactions_for_user, mark_recurring_transaction_processed,
    update_recurring_transaction,
};
pub use endpoints::{
    ProcessingSummary, create_recurring_transaction_endpoint,
    delete_recurring_transaction_endpoint, get_recurring_transaction_endpoint,
    get_recurring_transactions_endpoint, process_recurring_transactions_endpoint,
    update_recurring_transaction_endpoint,
};
pub use models::{
    Frequency, NewRecurringTransaction, RecurringTransaction, RecurringTransactionId,
    UpdateRecurringTransaction,
};
pub use processor::process_recurring_transactions;
pub use schedule::evaluate;
