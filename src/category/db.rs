//! Database queries for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::models::{Category, CategoryId, CategoryName},
    user::UserID,
};

/// The shared categories inserted into an empty database so that a fresh
/// install is usable without any setup.
const DEFAULT_CATEGORY_NAMES: [&str; 8] = [
    "Salary",
    "Groceries",
    "Rent",
    "Utilities",
    "Transport",
    "Eating Out",
    "Entertainment",
    "Other",
];

/// Create a category in the database.
///
/// A `user_id` of `None` creates a shared/default category that every user
/// can see.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidUser] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    user_id: Option<UserID>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, user_id) VALUES (?1, ?2)",
            (name.as_ref(), user_id.map(|id| id.as_i64())),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidUser
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, user_id })
}

/// Retrieve a category in the database by `category_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, user_id FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve the categories visible to `user_id`: the categories they own plus
/// the shared/default categories.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_categories_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, user_id FROM category
             WHERE user_id = :user_id OR user_id IS NULL
             ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a category by `category_id`, checking that `user_id` is allowed
/// to use it (they own it, or it is a shared/default category).
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user. The two cases are deliberately indistinguishable so that
///   a client cannot probe for other users' categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_visible_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = match get_category(category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::InvalidCategory(Some(category_id))),
        Err(error) => return Err(error),
    };

    match category.user_id {
        None => Ok(category),
        Some(owner) if owner == user_id => Ok(category),
        Some(_) => Err(Error::InvalidCategory(Some(category_id))),
    }
}

/// Update a category's name in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the category doesn't exist.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category from the database.
///
/// Transactions, budgets and recurring transactions referencing the category
/// are deleted along with it by the foreign key cascade.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the category doesn't exist.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                user_id INTEGER,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Improve performance when filtering categories by owner
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id)",
        (),
    )?;

    Ok(())
}

/// Insert the shared default categories into an empty category table.
///
/// Does nothing if the table already contains any category, so it is safe to
/// call on every start-up.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    for name in DEFAULT_CATEGORY_NAMES {
        connection.execute(
            "INSERT INTO category (name, user_id) VALUES (?1, NULL)",
            [name],
        )?;
    }

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;

    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    let user_id = row.get::<_, Option<i64>>(2)?.map(UserID::new);

    Ok(Category { id, name, user_id })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::models::CategoryName,
        db::initialize,
        user::{User, create_user},
    };

    use super::{
        create_category, delete_category, get_categories_for_user, get_category,
        get_visible_category, update_category,
    };

    fn get_test_db_connection_and_user() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let user = create_user("Alice", "alice@example.com".parse().unwrap(), &connection)
            .expect("Could not create test user");

        (connection, user)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user) = get_test_db_connection_and_user();

        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            Some(user.id),
            &connection,
        )
        .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name.as_ref(), "Groceries");
        assert_eq!(category.user_id, Some(user.id));
    }

    #[test]
    fn create_category_fails_on_invalid_user() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = create_category(
            CategoryName::new_unchecked("Groceries"),
            Some(crate::user::UserID::new(999)),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidUser));
    }

    #[test]
    fn get_category_succeeds() {
        let (connection, user) = get_test_db_connection_and_user();
        let inserted_category = create_category(
            CategoryName::new_unchecked("Transport"),
            Some(user.id),
            &connection,
        )
        .unwrap();

        let selected_category = get_category(inserted_category.id, &connection);

        assert_eq!(Ok(inserted_category), selected_category);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let (connection, _) = get_test_db_connection_and_user();

        let selected_category = get_category(99999, &connection);

        assert_eq!(selected_category, Err(Error::NotFound));
    }

    #[test]
    fn get_categories_for_user_includes_shared_categories() {
        let (connection, user) = get_test_db_connection_and_user();

        let shared =
            create_category(CategoryName::new_unchecked("Shared"), None, &connection).unwrap();
        let owned = create_category(
            CategoryName::new_unchecked("Mine"),
            Some(user.id),
            &connection,
        )
        .unwrap();

        let other_user =
            create_user("Bob", "bob@example.com".parse().unwrap(), &connection).unwrap();
        let someone_elses = create_category(
            CategoryName::new_unchecked("Theirs"),
            Some(other_user.id),
            &connection,
        )
        .unwrap();

        let categories = get_categories_for_user(user.id, &connection).unwrap();

        assert!(categories.contains(&shared));
        assert!(categories.contains(&owned));
        assert!(!categories.contains(&someone_elses));
    }

    #[test]
    fn get_visible_category_rejects_other_users_category() {
        let (connection, user) = get_test_db_connection_and_user();
        let other_user =
            create_user("Bob", "bob@example.com".parse().unwrap(), &connection).unwrap();
        let someone_elses = create_category(
            CategoryName::new_unchecked("Theirs"),
            Some(other_user.id),
            &connection,
        )
        .unwrap();

        let result = get_visible_category(someone_elses.id, user.id, &connection);

        assert_eq!(result, Err(Error::InvalidCategory(Some(someone_elses.id))));
    }

    #[test]
    fn get_visible_category_accepts_shared_category() {
        let (connection, user) = get_test_db_connection_and_user();
        let shared =
            create_category(CategoryName::new_unchecked("Shared"), None, &connection).unwrap();

        let result = get_visible_category(shared.id, user.id, &connection);

        assert_eq!(result, Ok(shared));
    }

    #[test]
    fn update_category_succeeds() {
        let (connection, user) = get_test_db_connection_and_user();
        let category = create_category(
            CategoryName::new_unchecked("Old Name"),
            Some(user.id),
            &connection,
        )
        .unwrap();

        let result = update_category(
            category.id,
            CategoryName::new_unchecked("New Name"),
            &connection,
        );

        assert!(result.is_ok());

        let updated_category = get_category(category.id, &connection).unwrap();
        assert_eq!(updated_category.name.as_ref(), "New Name");
    }

    #[test]
    fn update_category_with_invalid_id_returns_missing() {
        let (connection, _) = get_test_db_connection_and_user();

        let result = update_category(
            99999,
            CategoryName::new_unchecked("New Name"),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_succeeds() {
        let (connection, user) = get_test_db_connection_and_user();
        let category = create_category(
            CategoryName::new_unchecked("To Delete"),
            Some(user.id),
            &connection,
        )
        .unwrap();

        let result = delete_category(category.id, &connection);

        assert!(result.is_ok());
        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_category_with_invalid_id_returns_missing() {
        let (connection, _) = get_test_db_connection_and_user();

        let result = delete_category(99999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }
}
