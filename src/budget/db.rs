//! Database queries for budgets.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    budget::models::{Budget, BudgetId, BudgetStatus, NewBudget},
    category::get_visible_category,
    user::UserID,
};

/// Create a budget in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist or is not
///   visible to the budget's user,
/// - [Error::DuplicateBudget] if the user already has a budget for this
///   category and period,
/// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    get_visible_category(new_budget.category_id, new_budget.user_id, connection)?;

    connection
        .execute(
            "INSERT INTO budget (user_id, category_id, amount, period) VALUES (?1, ?2, ?3, ?4)",
            (
                new_budget.user_id.as_i64(),
                new_budget.category_id,
                new_budget.amount,
                new_budget.period.as_str(),
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

    Ok(Budget {
        id,
        user_id: new_budget.user_id,
        category_id: new_budget.category_id,
        amount: new_budget.amount,
        period: new_budget.period,
    })
}

/// Retrieve a budget in the database by `budget_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `budget_id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(budget_id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare("SELECT id, user_id, category_id, amount, period FROM budget WHERE id = :id")?
        .query_row(&[(":id", &budget_id)], map_budget_row)
        .map_err(|error| error.into())
}

/// Retrieve all budgets belonging to `user_id`.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budgets_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, period FROM budget
             WHERE user_id = :user_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Compare each of `user_id`'s budgets against the expense transactions
/// recorded in the budget's period containing `date`.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budget_statuses(
    user_id: UserID,
    date: Date,
    connection: &Connection,
) -> Result<Vec<BudgetStatus>, Error> {
    let budgets = get_budgets_for_user(user_id, connection)?;

    budgets
        .into_iter()
        .map(|budget| {
            let range = budget.period.range_containing(date);
            let spent = sum_expenses(user_id, budget.category_id, &range, connection)?;

            Ok(BudgetStatus {
                period_start: *range.start(),
                period_end: *range.end(),
                spent,
                remaining: budget.amount - spent,
                budget,
            })
        })
        .collect()
}

/// Update a budget in the database, replacing every mutable column.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the budget doesn't exist.
pub fn update_budget(budget: &Budget, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget SET amount = ?1, period = ?2 WHERE id = ?3",
        (budget.amount, budget.period.as_str(), budget.id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete a budget from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the budget doesn't exist.
pub fn delete_budget(budget_id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [budget_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                period TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, category_id, period)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user_id ON budget(user_id)",
        (),
    )?;

    Ok(())
}

fn sum_expenses(
    user_id: UserID,
    category_id: i64,
    range: &std::ops::RangeInclusive<Date>,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND category_id = ?2 AND transaction_type = 'expense'
               AND date BETWEEN ?3 AND ?4",
            (
                user_id.as_i64(),
                category_id,
                range.start().to_string(),
                range.end().to_string(),
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_period: String = row.get(4)?;
    let period = raw_period.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        period,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, Month};

    use crate::{
        Error,
        budget::models::{BudgetPeriod, NewBudget},
        category::{Category, CategoryName, create_category},
        db::initialize,
        transaction::{NewTransaction, TransactionType, create_transaction},
        user::{User, create_user},
    };

    use super::{
        create_budget, delete_budget, get_budget, get_budget_statuses, get_budgets_for_user,
        update_budget,
    };

    fn get_test_db_connection() -> (Connection, User, Category) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let user = create_user("Alice", "alice@example.com".parse().unwrap(), &connection)
            .expect("Could not create test user");
        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            Some(user.id),
            &connection,
        )
        .expect("Could not create test category");

        (connection, user, category)
    }

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    #[test]
    fn create_budget_succeeds() {
        let (connection, user, category) = get_test_db_connection();

        let budget = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .expect("Could not create budget");

        assert!(budget.id > 0);
        assert_eq!(budget.amount, 500.0);
        assert_eq!(budget.period, BudgetPeriod::Monthly);
    }

    #[test]
    fn create_budget_fails_on_duplicate_period() {
        let (connection, user, category) = get_test_db_connection();

        let new_budget = NewBudget {
            user_id: user.id,
            category_id: category.id,
            amount: 500.0,
            period: BudgetPeriod::Monthly,
        };
        create_budget(
            NewBudget {
                amount: 250.0,
                ..new_budget
            },
            &connection,
        )
        .unwrap();

        let result = create_budget(new_budget, &connection);

        assert_eq!(result, Err(Error::DuplicateBudget));
    }

    #[test]
    fn create_budget_allows_same_category_with_different_period() {
        let (connection, user, category) = get_test_db_connection();

        create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 125.0,
                period: BudgetPeriod::Weekly,
            },
            &connection,
        )
        .unwrap();

        let result = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_budget_fails_on_invalid_category() {
        let (connection, user, category) = get_test_db_connection();

        let result = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id + 99,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category.id + 99))));
    }

    #[test]
    fn get_budget_succeeds() {
        let (connection, user, category) = get_test_db_connection();
        let inserted = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        let selected = get_budget(inserted.id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_budgets_for_user_excludes_other_users() {
        let (connection, user, category) = get_test_db_connection();
        let budget = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        let other_user =
            create_user("Bob", "bob@example.com".parse().unwrap(), &connection).unwrap();

        assert_eq!(
            get_budgets_for_user(user.id, &connection).unwrap(),
            vec![budget]
        );
        assert!(
            get_budgets_for_user(other_user.id, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn budget_status_sums_expenses_in_period_only() {
        let (connection, user, category) = get_test_db_connection();
        create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        let expense = |amount: f64, transaction_date: Date| NewTransaction {
            user_id: user.id,
            transaction_type: TransactionType::Expense,
            amount,
            date: transaction_date,
            description: "Shop".to_string(),
            category_id: category.id,
            notes: None,
        };

        // In the period.
        create_transaction(expense(100.0, date(2024, Month::June, 5)), &connection).unwrap();
        create_transaction(expense(50.0, date(2024, Month::June, 20)), &connection).unwrap();
        // Outside the period.
        create_transaction(expense(999.0, date(2024, Month::May, 31)), &connection).unwrap();
        // Income in the period must not count towards spending.
        let mut wages = expense(999.0, date(2024, Month::June, 10));
        wages.transaction_type = TransactionType::Income;
        create_transaction(wages, &connection).unwrap();

        let statuses =
            get_budget_statuses(user.id, date(2024, Month::June, 15), &connection).unwrap();

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].spent, 150.0);
        assert_eq!(statuses[0].remaining, 350.0);
        assert_eq!(statuses[0].period_start, date(2024, Month::June, 1));
        assert_eq!(statuses[0].period_end, date(2024, Month::June, 30));
    }

    #[test]
    fn budget_status_reports_overspend_as_negative_remaining() {
        let (connection, user, category) = get_test_db_connection();
        create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 100.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        create_transaction(
            NewTransaction {
                user_id: user.id,
                transaction_type: TransactionType::Expense,
                amount: 150.0,
                date: date(2024, Month::June, 5),
                description: "Shop".to_string(),
                category_id: category.id,
                notes: None,
            },
            &connection,
        )
        .unwrap();

        let statuses =
            get_budget_statuses(user.id, date(2024, Month::June, 15), &connection).unwrap();

        assert_eq!(statuses[0].remaining, -50.0);
    }

    #[test]
    fn update_budget_succeeds() {
        let (connection, user, category) = get_test_db_connection();
        let mut budget = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        budget.amount = 600.0;
        budget.period = BudgetPeriod::Yearly;

        let result = update_budget(&budget, &connection);

        assert!(result.is_ok());
        assert_eq!(get_budget(budget.id, &connection), Ok(budget));
    }

    #[test]
    fn update_budget_fails_on_invalid_id() {
        let (connection, user, category) = get_test_db_connection();
        let mut budget = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();
        budget.id += 99;

        let result = update_budget(&budget, &connection);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn delete_budget_succeeds() {
        let (connection, user, category) = get_test_db_connection();
        let budget = create_budget(
            NewBudget {
                user_id: user.id,
                category_id: category.id,
                amount: 500.0,
                period: BudgetPeriod::Monthly,
            },
            &connection,
        )
        .unwrap();

        let result = delete_budget(budget.id, &connection);

        assert!(result.is_ok());
        assert_eq!(get_budget(budget.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_budget_fails_on_invalid_id() {
        let (connection, _, _) = get_test_db_connection();

        let result = delete_budget(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingBudget));
    }
}
