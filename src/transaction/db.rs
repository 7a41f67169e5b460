//! Database queries for transactions.

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    category::get_visible_category,
    transaction::{
        models::{NewTransaction, Transaction, TransactionId},
        query::{SortOrder, TransactionQuery},
    },
    user::UserID,
};

/// Create a transaction in the database.
///
/// The category is checked first: it must exist and be visible to the
/// transaction's user (owned by them or shared).
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if `category_id` does not refer to a category
///   the user can see,
/// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_visible_category(
        new_transaction.category_id,
        new_transaction.user_id,
        connection,
    )?;

    connection
        .execute(
            "INSERT INTO \"transaction\" (user_id, transaction_type, amount, date, description, category_id, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                new_transaction.user_id.as_i64(),
                new_transaction.transaction_type.as_str(),
                new_transaction.amount,
                new_transaction.date,
                &new_transaction.description,
                new_transaction.category_id,
                &new_transaction.notes,
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

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        transaction_type: new_transaction.transaction_type,
        amount: new_transaction.amount,
        date: new_transaction.date,
        description: new_transaction.description,
        category_id: new_transaction.category_id,
        notes: new_transaction.notes,
    })
}

/// Retrieve a transaction in the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, transaction_type, amount, date, description, category_id, notes
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Query for transactions in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, query_parameters) = build_where_clause(query);

    let mut query_string_parts = vec![
        "SELECT id, user_id, transaction_type, amount, date, description, category_id, notes
         FROM \"transaction\""
            .to_string(),
        where_clause,
    ];

    match query.sort_date {
        Some(SortOrder::Ascending) => query_string_parts.push("ORDER BY date ASC".to_string()),
        Some(SortOrder::Descending) => query_string_parts.push("ORDER BY date DESC".to_string()),
        None => {}
    }

    if let Some(limit) = query.limit {
        query_string_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
    }

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// Count the transactions that match `query`, ignoring its limit and offset.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, query_parameters) = build_where_clause(query);
    let query_string = format!("SELECT COUNT(id) FROM \"transaction\" {where_clause}");
    let params = params_from_iter(query_parameters.iter());

    connection
        .query_row(&query_string, params, |row| row.get::<_, i64>(0))
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Update a transaction in the database, replacing every mutable column.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the transaction doesn't exist.
pub fn update_transaction(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET transaction_type = ?1, amount = ?2, date = ?3, description = ?4, category_id = ?5, notes = ?6
         WHERE id = ?7",
        (
            transaction.transaction_type.as_str(),
            transaction.amount,
            transaction.date,
            &transaction.description,
            transaction.category_id,
            &transaction.notes,
            transaction.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the transaction doesn't exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                transaction_type TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                notes TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Most queries filter by user and date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id)",
        (),
    )?;

    Ok(())
}

fn build_where_clause(query: &TransactionQuery) -> (String, Vec<Value>) {
    let mut where_clause_parts = vec!["user_id = ?1".to_string()];
    let mut query_parameters = vec![Value::Integer(query.user_id.as_i64())];

    if let Some(ref date_range) = query.date_range {
        where_clause_parts.push(format!(
            "date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(transaction_type) = query.transaction_type {
        where_clause_parts.push(format!(
            "transaction_type = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Text(transaction_type.as_str().to_string()));
    }

    if let Some(category_id) = query.category_id {
        where_clause_parts.push(format!("category_id = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(category_id));
    }

    let where_clause = String::from("WHERE ") + &where_clause_parts.join(" AND ");

    (where_clause, query_parameters)
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(2)?;
    let transaction_type = raw_type.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        category_id: row.get(6)?,
        notes: row.get(7)?,
    })
}
