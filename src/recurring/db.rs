//! Database queries for recurring transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    category::get_visible_category,
    recurring::models::{NewRecurringTransaction, RecurringTransaction, RecurringTransactionId},
    user::UserID,
};

/// Create a recurring transaction in the database.
///
/// The caller is expected to have validated the schedule fields at the REST
/// boundary; this function only checks referential integrity.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist or is not
///   visible to the definition's user,
/// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_recurring_transaction(
    new_recurring: NewRecurringTransaction,
    connection: &Connection,
) -> Result<RecurringTransaction, Error> {
    get_visible_category(new_recurring.category_id, new_recurring.user_id, connection)?;

    connection
        .execute(
            "INSERT INTO recurring_transaction
             (user_id, category_id, transaction_type, amount, description, notes,
              frequency, start_date, end_date, day_of_week, day_of_month, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            (
                new_recurring.user_id.as_i64(),
                new_recurring.category_id,
                new_recurring.transaction_type.as_str(),
                new_recurring.amount,
                &new_recurring.description,
                &new_recurring.notes,
                new_recurring.frequency.as_str(),
                new_recurring.start_date,
                new_recurring.end_date,
                new_recurring.day_of_week,
                new_recurring.day_of_month,
                new_recurring.is_active,
            ),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            // The category was checked above, so the offending key is the user.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidUser
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(RecurringTransaction {
        id,
        user_id: new_recurring.user_id,
        category_id: new_recurring.category_id,
        transaction_type: new_recurring.transaction_type,
        amount: new_recurring.amount,
        description: new_recurring.description,
        notes: new_recurring.notes,
        frequency: new_recurring.frequency,
        start_date: new_recurring.start_date,
        end_date: new_recurring.end_date,
        day_of_week: new_recurring.day_of_week,
        day_of_month: new_recurring.day_of_month,
        last_processed_date: None,
        is_active: new_recurring.is_active,
    })
}

/// Retrieve a recurring transaction in the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid recurring transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_recurring_transaction(
    id: RecurringTransactionId,
    connection: &Connection,
) -> Result<RecurringTransaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {COLUMNS} FROM recurring_transaction WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_recurring_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve all recurring transactions belonging to `user_id`, active or not.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_recurring_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecurringTransaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {COLUMNS} FROM recurring_transaction WHERE user_id = :user_id ORDER BY id ASC"
        ))?
        .query_map(
            &[(":user_id", &user_id.as_i64())],
            map_recurring_transaction_row,
        )?
        .map(|maybe_recurring| maybe_recurring.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every active recurring transaction, across all users.
///
/// This is the listing the processor runs over.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_active_recurring_transactions(
    connection: &Connection,
) -> Result<Vec<RecurringTransaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {COLUMNS} FROM recurring_transaction WHERE is_active = 1 ORDER BY id ASC"
        ))?
        .query_map([], map_recurring_transaction_row)?
        .map(|maybe_recurring| maybe_recurring.map_err(|error| error.into()))
        .collect()
}

/// Update a recurring transaction in the database, replacing every
/// user-editable column.
///
/// `last_processed_date` is left untouched, only
/// [mark_recurring_transaction_processed] writes it.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the
/// recurring transaction doesn't exist.
pub fn update_recurring_transaction(
    recurring: &RecurringTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_transaction
         SET category_id = ?1, transaction_type = ?2, amount = ?3, description = ?4,
             notes = ?5, frequency = ?6, start_date = ?7, end_date = ?8,
             day_of_week = ?9, day_of_month = ?10, is_active = ?11
         WHERE id = ?12",
        (
            recurring.category_id,
            recurring.transaction_type.as_str(),
            recurring.amount,
            &recurring.description,
            &recurring.notes,
            recurring.frequency.as_str(),
            recurring.start_date,
            recurring.end_date,
            recurring.day_of_week,
            recurring.day_of_month,
            recurring.is_active,
            recurring.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRecurringTransaction);
    }

    Ok(())
}

/// Claim `date` as the last processed date of a recurring transaction.
///
/// The update is conditional: it only takes effect when the definition is
/// still active and has not already been processed for `date`. Returns
/// whether the claim took effect. Running the processor twice for the same
/// calendar date therefore materializes at most one transaction per
/// definition, even when two runs overlap, whichever run loses the claim
/// skips the emission.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn mark_recurring_transaction_processed(
    id: RecurringTransactionId,
    date: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_transaction
         SET last_processed_date = ?1
         WHERE id = ?2 AND is_active = 1
           AND (last_processed_date IS NULL OR last_processed_date <> ?1)",
        (date, id),
    )?;

    Ok(rows_affected > 0)
}

/// Delete a recurring transaction from the database.
///
/// Transactions it previously materialized are ordinary transactions and are
/// not affected.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the
/// recurring transaction doesn't exist.
pub fn delete_recurring_transaction(
    id: RecurringTransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM recurring_transaction WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecurringTransaction);
    }

    Ok(())
}

/// Create the recurring transaction table.
pub fn create_recurring_transaction_table(
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                transaction_type TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                notes TEXT,
                frequency TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                day_of_week INTEGER,
                day_of_month INTEGER,
                last_processed_date TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // The processor scans for active definitions on every run.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_recurring_transaction_is_active
         ON recurring_transaction(is_active)",
        (),
    )?;

    Ok(())
}

const COLUMNS: &str = "id, user_id, category_id, transaction_type, amount, description, notes,
                       frequency, start_date, end_date, day_of_week, day_of_month,
                       last_processed_date, is_active";

fn map_recurring_transaction_row(row: &Row) -> Result<RecurringTransaction, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let transaction_type = raw_type.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let raw_frequency: String = row.get(7)?;
    let frequency = raw_frequency.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(RecurringTransaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        transaction_type,
        amount: row.get(4)?,
        description: row.get(5)?,
        notes: row.get(6)?,
        frequency,
        start_date: row.get(8)?,
        end_date: row.get(9)?,
        day_of_week: row.get(10)?,
        day_of_month: row.get(11)?,
        last_processed_date: row.get(12)?,
        is_active: row.get(13)?,
    })
}
