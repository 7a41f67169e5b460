//! Route handlers for creating, listing, updating and deleting categories.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    Error,
    category::{
        db::{
            create_category, delete_category, get_categories_for_user, get_category,
            update_category,
        },
        models::{Category, CategoryId, CategoryName, CategoryState, NewCategory, UpdateCategory},
    },
    user::UserID,
};

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    /// The acting user. The response contains their categories plus the
    /// shared/default categories.
    pub user_id: UserID,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&new_category.name)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(name, Some(new_category.user_id), &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for listing the categories visible to a user.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Query(params): Query<CategoryListParams>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_for_user(params.user_id, &connection)?;

    Ok(Json(categories))
}

/// A route handler for getting a category by its database ID.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, &connection)?;

    Ok(Json(category))
}

/// A route handler for updating a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    Json(update): Json<UpdateCategory>,
) -> Result<Json<Category>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    if let Some(name) = update.name {
        let name = CategoryName::new(&name)?;
        update_category(category_id, name, &connection)?;
    }

    let category = get_category(category_id, &connection)?;

    Ok(Json(category))
}

/// A route handler for deleting a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
