//! Defines the endpoint for listing expenses.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    expense::{
        core::Expense,
        query::{ExpenseFilter, query_expenses},
    },
    timestamp::{format_timestamp, parse_date},
};

/// How many expenses are listed when the client does not give a limit.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// The state needed to list expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The largest limit a client may request, if any.
    pub max_list_limit: Option<u32>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            max_list_limit: state.max_list_limit,
        }
    }
}

/// The query parameters for listing expenses.
///
/// Every parameter is optional and empty values count as not given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Only list expenses with exactly this category label.
    pub category: Option<String>,
    /// Only list expenses on or after this `YYYY-MM-DD` date.
    pub start: Option<String>,
    /// Only list expenses on or before this `YYYY-MM-DD` date.
    pub end: Option<String>,
    /// The most expenses to list, `0` for no limit.
    pub limit: Option<String>,
}

/// An expense as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    /// The ID the store assigned to the expense.
    pub id: String,
    /// How much was spent.
    pub amount: f64,
    /// The category label.
    pub category: Option<String>,
    /// When the money was spent, as ISO-8601 text.
    pub date: String,
    /// Free text notes.
    pub notes: Option<String>,
    /// How the expense was paid.
    pub payment_method: Option<String>,
    /// Where the money was spent.
    pub merchant: Option<String>,
    /// When the record was created, as ISO-8601 text.
    pub created_at: Option<String>,
    /// When the record was last changed, as ISO-8601 text.
    pub updated_at: Option<String>,
}

impl TryFrom<Expense> for ExpenseItem {
    type Error = Error;

    fn try_from(expense: Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: expense.id.to_string(),
            amount: expense.amount,
            category: expense.category,
            date: format_timestamp(expense.date)?,
            notes: expense.notes,
            payment_method: expense.payment_method,
            merchant: expense.merchant,
            created_at: expense.created_at.map(format_timestamp).transpose()?,
            updated_at: expense.updated_at.map(format_timestamp).transpose()?,
        })
    }
}

/// The response body for a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseList {
    /// The matching expenses, in the order they were stored.
    pub items: Vec<ExpenseItem>,
}

/// A route handler for listing expenses, optionally filtered by category and
/// date range.
pub async fn list_expenses_endpoint(
    State(state): State<ListExpensesState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ExpenseList>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;

    let start = parse_date_parameter("start", query.start.as_deref())?;
    let end = parse_date_parameter("end", query.end.as_deref())?;
    let requested_limit = parse_limit(query.limit.as_deref())?;

    let filter = ExpenseFilter::for_listing(query.category.as_deref(), start, end);
    let limit = resolve_limit(requested_limit, state.max_list_limit);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let expenses = query_expenses(&filter, limit, &connection)
        .inspect_err(|error| tracing::error!("could not list expenses: {error}"))?;

    let items = expenses
        .into_iter()
        .map(ExpenseItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ExpenseList { items }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn parse_date_parameter(name: &str, value: Option<&str>) -> Result<Option<Date>, Error> {
    non_empty(value)
        .map(|value| {
            parse_date(value).map_err(|_| {
                Error::InvalidQuery(format!("{name}: '{value}' is not a date in YYYY-MM-DD format"))
            })
        })
        .transpose()
}

fn parse_limit(value: Option<&str>) -> Result<u32, Error> {
    match non_empty(value) {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(value) => value.parse().map_err(|_| {
            Error::InvalidQuery(format!("limit: '{value}' is not a non-negative integer"))
        }),
    }
}

/// The limit to query the store with, `None` meaning no limit.
///
/// A requested limit of zero means no limit, which is capped by
/// `max_list_limit` like any other limit.
fn resolve_limit(requested: u32, max_list_limit: Option<u32>) -> Option<u32> {
    match (requested, max_list_limit) {
        (0, max_list_limit) => max_list_limit,
        (requested, Some(max_list_limit)) => Some(requested.min(max_list_limit)),
        (requested, None) => Some(requested),
    }
}
