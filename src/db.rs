//! Sets up the application's database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    budget::create_budget_table,
    category::{create_category_table, seed_default_categories},
    recurring::create_recurring_transaction_table,
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the domain models and seed the shared default
/// categories.
///
/// All tables are created with `IF NOT EXISTS`, so calling this on an
/// existing database is a no-op.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&sql_transaction)?;
    create_category_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;
    create_budget_table(&sql_transaction)?;
    create_recurring_transaction_table(&sql_transaction)?;

    seed_default_categories(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
