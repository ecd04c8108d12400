//! Expense management for the tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the validation of new expenses
//! - Database functions for storing and querying expenses
//! - The aggregation of expenses into a summary
//! - The route handlers for the expense API

mod core;
mod create_endpoint;
mod list_endpoint;
mod query;
mod summary;
mod summary_endpoint;
mod validation;

pub use self::core::{Expense, ExpenseId, NewExpense, create_expense, create_expense_table};
pub use create_endpoint::{CreatedExpense, create_expense_endpoint};
pub use list_endpoint::{DEFAULT_LIST_LIMIT, ExpenseItem, ExpenseList, list_expenses_endpoint};
pub use query::{ExpenseFilter, query_expenses};
pub use summary::{Summary, summarize};
pub use summary_endpoint::get_summary_endpoint;
pub use validation::{ExpensePayload, FieldError, ValidationErrors};
