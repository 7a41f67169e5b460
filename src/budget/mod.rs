//! Budgets cap spending per category over a repeating period (week, month or
//! year). A budget does not block transactions, it is compared against actual
//! spending to report how much of the limit is used.

mod db;
mod endpoints;
mod models;

pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budget_statuses,
    get_budgets_for_user, update_budget,
};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
    get_budget_statuses_endpoint, get_budgets_endpoint, update_budget_endpoint,
};
pub use models::{Budget, BudgetId, BudgetPeriod, BudgetStatus, NewBudget, UpdateBudget};
