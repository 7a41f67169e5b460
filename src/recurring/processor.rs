//! Materializes recurring transactions into ordinary transactions.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    recurring::{
        db::{get_active_recurring_transactions, mark_recurring_transaction_processed},
        models::RecurringTransaction,
        schedule::evaluate,
    },
    transaction::{NewTransaction, create_transaction},
};

/// Run the schedule rule over every active recurring transaction for
/// `run_date` and materialize the matches. Returns the number of
/// transactions created.
///
/// `run_date` is an explicit parameter rather than the wall clock so that
/// runs are deterministic; callers at the boundary (the REST endpoint and
/// the CLI) pass today's date in the configured timezone.
///
/// Each definition is processed independently: a failure to materialize one
/// definition is logged and skipped, the rest of the batch still runs.
/// Only a failure to list the active definitions aborts the whole run.
///
/// Running the processor more than once for the same calendar date creates
/// no duplicates. The schedule rule skips definitions already processed for
/// `run_date`, and the materialization step re-checks that guard with a
/// conditional update before inserting, so overlapping runs cannot both
/// emit for the same definition (see
/// [mark_recurring_transaction_processed]).
pub fn process_recurring_transactions(
    run_date: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let definitions = get_active_recurring_transactions(connection)?;

    tracing::debug!(
        "processing {} active recurring transactions for {run_date}",
        definitions.len()
    );

    let mut created = 0;

    for definition in definitions {
        let Some(matched_date) = evaluate(&definition, run_date) else {
            continue;
        };

        match materialize(&definition, matched_date, connection) {
            Ok(true) => {
                tracing::info!(
                    "materialized recurring transaction {} for {matched_date}",
                    definition.id
                );
                created += 1;
            }
            Ok(false) => {
                tracing::debug!(
                    "recurring transaction {} was already processed for {matched_date}",
                    definition.id
                );
            }
            Err(error) => {
                tracing::error!(
                    "failed to materialize recurring transaction {}: {error}",
                    definition.id
                );
            }
        }
    }

    Ok(created)
}

/// Claim `matched_date` on the definition and insert the concrete
/// transaction. Both writes commit in one SQL transaction: if the insert
/// fails the claim is rolled back, leaving the definition eligible for a
/// retry.
///
/// Returns false when the claim was lost, i.e. another run already
/// materialized this definition for `matched_date`.
fn materialize(
    definition: &RecurringTransaction,
    matched_date: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    if !mark_recurring_transaction_processed(definition.id, matched_date, &sql_transaction)? {
        return Ok(false);
    }

    create_transaction(
        NewTransaction {
            user_id: definition.user_id,
            transaction_type: definition.transaction_type,
            amount: definition.amount,
            date: matched_date,
            description: definition.description.clone(),
            category_id: definition.category_id,
            notes: definition.notes.clone(),
        },
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(true)
}
