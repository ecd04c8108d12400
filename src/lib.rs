//! Expense Tracker is a small JSON backend for recording daily expenses.
//!
//! Clients submit expenses with an amount, a category from a fixed list and
//! a date. The expenses can then be listed with filters, and summarised
//! into a total and per-category totals for a month.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod category;
mod db;
mod diagnostics;
mod endpoints;
mod expense;
mod logging;
mod routing;
mod timestamp;

pub use app_state::AppState;
pub use category::{Category, UnknownCategory};
pub use db::initialize as initialize_db;
pub use expense::{
    CreatedExpense, DEFAULT_LIST_LIMIT, Expense, ExpenseFilter, ExpenseId, ExpenseItem,
    ExpenseList, ExpensePayload, FieldError, NewExpense, Summary, ValidationErrors,
    create_expense, query_expenses, summarize,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The message sent to clients in place of internal error details.
const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields of an expense failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The request body could not be read as an expense payload, e.g. it is
    /// not JSON.
    #[error("invalid request body: {0}")]
    InvalidPayload(String),

    /// A query string parameter could not be parsed.
    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),

    /// The month and year given for a summary do not describe a real month.
    #[error("invalid summary period: {0}")]
    InvalidSummaryPeriod(String),

    /// The summary could not be computed.
    ///
    /// Every failure while summarising is reported to the client with this
    /// error, including store failures.
    #[error("could not compute summary: {0}")]
    Summary(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A timestamp could not be rendered as text.
    #[error("could not format timestamp: {0}")]
    TimestampFormat(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<time::error::Format> for Error {
    fn from(value: time::error::Format) -> Self {
        tracing::error!("could not format timestamp: {}", value);
        Error::TimestampFormat(value.to_string())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::InvalidPayload(_)
            | Error::InvalidQuery(_)
            | Error::InvalidSummaryPeriod(_)
            | Error::Summary(_) => StatusCode::BAD_REQUEST,
            Error::SqlError(_) | Error::DatabaseLockError | Error::TimestampFormat(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match &self {
            // Store failures are not intended to be shown to the client.
            Error::SqlError(_) | Error::DatabaseLockError | Error::TimestampFormat(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                INTERNAL_ERROR_DETAIL.to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
