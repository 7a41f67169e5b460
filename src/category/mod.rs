//! Categories group transactions, budgets and recurring transactions.
//! A category is either owned by a single user or shared by everyone
//! (a NULL owner marks a shared/default category).

mod db;
mod endpoints;
mod models;

pub use db::{
    create_category, create_category_table, get_categories_for_user, get_category,
    get_visible_category, seed_default_categories,
};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, update_category_endpoint,
};
pub use models::{Category, CategoryId, CategoryName};
