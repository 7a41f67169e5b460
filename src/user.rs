//! Code for creating the user table and fetching users from the database.
//!
//! Authentication and session management are out of scope for this
//! application, a user row only records who owns the data. Callers of the
//! REST API identify the acting user by ID.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address. Unique across the application.
    pub email: EmailAddress,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyUserName] if `name` is empty or whitespace,
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn create_user(name: &str, email: EmailAddress, connection: &Connection) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyUserName);
    }

    connection.execute(
        "INSERT INTO user (name, email) VALUES (?1, ?2)",
        (name, email.as_str()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_string(),
        email,
    })
}

/// Retrieve a user from the database by their `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not refer to a valid user,
/// - or [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| {
            let id = UserID::new(row.get(0)?);
            let name = row.get(1)?;

            let raw_email: String = row.get(2)?;
            let email = raw_email.parse().map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?;

            Ok(User { id, name, email })
        })
        .map_err(|error| error.into())
}

/// The state needed for the user route handlers.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The payload for creating a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The user's email address. Must not belong to another user.
    pub email: EmailAddress,
}

/// A route handler for creating a new user.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(&new_user.name, new_user.email, &connection)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// A route handler for getting a user by their database ID.
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(UserID::new(user_id), &connection)?;

    Ok(Json(user))
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{UserID, create_user, get_user_by_id};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_user_succeeds() {
        let connection = get_test_db_connection();

        let user = create_user("Alice", "alice@example.com".parse().unwrap(), &connection)
            .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email.as_str(), "alice@example.com");
    }

    #[test]
    fn create_user_fails_on_empty_name() {
        let connection = get_test_db_connection();

        let result = create_user("   ", "alice@example.com".parse().unwrap(), &connection);

        assert_eq!(result, Err(Error::EmptyUserName));
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let connection = get_test_db_connection();
        create_user("Alice", "alice@example.com".parse().unwrap(), &connection).unwrap();

        let result = create_user("Alicia", "alice@example.com".parse().unwrap(), &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_succeeds() {
        let connection = get_test_db_connection();
        let inserted_user =
            create_user("Bob", "bob@example.com".parse().unwrap(), &connection).unwrap();

        let selected_user = get_user_by_id(inserted_user.id, &connection);

        assert_eq!(Ok(inserted_user), selected_user);
    }

    #[test]
    fn get_user_by_id_fails_on_invalid_id() {
        let connection = get_test_db_connection();

        let selected_user = get_user_by_id(UserID::new(1337), &connection);

        assert_eq!(selected_user, Err(Error::NotFound));
    }
}
