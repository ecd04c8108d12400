//! Defines the endpoint for creating a new expense.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    expense::{core::create_expense, validation::ExpensePayload},
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a newly created expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedExpense {
    /// The ID the store assigned to the expense.
    pub id: String,
    /// A confirmation message.
    pub message: String,
}

/// A route handler for creating a new expense.
///
/// The payload is validated before anything is stored, so an invalid payload
/// never creates a record.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<Json<CreatedExpense>, Error> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("rejected expense body: {rejection}");
        Error::InvalidPayload(rejection.body_text())
    })?;

    let expense = payload.validate().map_err(|errors| {
        tracing::debug!("invalid expense: {errors}");
        Error::Validation(errors)
    })?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let id = create_expense(expense, &connection)
        .inspect_err(|error| tracing::error!("could not create expense: {error}"))?;

    Ok(Json(CreatedExpense {
        id: id.to_string(),
        message: "Expense added".to_owned(),
    }))
}
