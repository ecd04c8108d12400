//! Defines the endpoint for the monthly expense summary.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    expense::{
        query::{ExpenseFilter, query_expenses},
        summary::{Summary, summarize},
    },
};

/// The state needed to summarise expenses.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for a summary.
///
/// The summary covers a single month only when both `month` and `year` are
/// given, otherwise it covers every expense.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    /// The month, 1 to 12.
    pub month: Option<String>,
    /// The year.
    pub year: Option<String>,
}

/// A route handler for summarising expenses, optionally for a single month.
///
/// Every failure, including a store failure, is reported as a
/// [Error::Summary] client error.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Summary>, Error> {
    compute_summary(&state, query).map(Json).map_err(|error| {
        tracing::warn!("could not compute summary: {error}");

        match error {
            Error::Summary(_) => error,
            error => Error::Summary(error.to_string()),
        }
    })
}

fn compute_summary(
    state: &SummaryState,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Summary, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;
    let filter = summary_filter(&query)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = query_expenses(&filter, None, &connection)?;

    Ok(summarize(&expenses))
}

/// Build the store filter for `query`.
///
/// Zero and empty values count as not given.
fn summary_filter(query: &SummaryQuery) -> Result<ExpenseFilter, Error> {
    let month: Option<u8> = parse_period_component("month", query.month.as_deref())?;
    let year: Option<i32> = parse_period_component("year", query.year.as_deref())?;

    match (month, year) {
        (Some(month), Some(year)) => ExpenseFilter::for_month(month, year),
        _ => Ok(ExpenseFilter::all()),
    }
}

fn parse_period_component<T>(name: &str, value: Option<&str>) -> Result<Option<T>, Error>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let parsed: T = value
        .parse()
        .map_err(|_| Error::InvalidQuery(format!("{name}: '{value}' is not a valid number")))?;

    Ok((parsed != T::default()).then_some(parsed))
}
