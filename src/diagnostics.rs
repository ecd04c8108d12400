//! Liveness and database diagnostic routes.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppState;

/// The most table names listed in a [StoreReport].
const MAX_LISTED_COLLECTIONS: usize = 10;

/// The state needed to probe the database.
#[derive(Debug, Clone)]
pub struct DiagnosticsState {
    /// The database connection to probe.
    pub db_connection: Arc<Mutex<Connection>>,
    /// A human readable name for the database.
    pub database_name: String,
}

impl FromRef<AppState> for DiagnosticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            database_name: state.database_name.clone(),
        }
    }
}

/// The result of probing the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreReport {
    /// Whether the backend is running, always "running" if a report is sent.
    pub backend: String,
    /// The outcome of the probe.
    pub database: String,
    /// The configured database.
    pub database_name: String,
    /// Either "Connected" or "Not Connected".
    pub connection_status: String,
    /// The names of the tables in the database.
    pub collections: Vec<String>,
}

/// The root route, confirms that the server is up.
pub async fn get_root() -> Json<Value> {
    Json(json!({ "message": "Expense Tracker Backend Ready" }))
}

/// Probe the database and report on its state.
///
/// Failures are described in the report rather than returned as an error
/// status.
pub async fn get_store_report(State(state): State<DiagnosticsState>) -> Json<StoreReport> {
    let probe = match state.db_connection.lock() {
        Ok(connection) => list_collections(&connection).map_err(|error| error.to_string()),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err("could not acquire the database lock".to_owned())
        }
    };

    let report = match probe {
        Ok(collections) => StoreReport {
            backend: "running".to_owned(),
            database: "connected and working".to_owned(),
            database_name: state.database_name,
            connection_status: "Connected".to_owned(),
            collections,
        },
        Err(error) => {
            tracing::warn!("database probe failed: {error}");

            StoreReport {
                backend: "running".to_owned(),
                database: format!("error: {error}"),
                database_name: state.database_name,
                connection_status: "Not Connected".to_owned(),
                collections: Vec::new(),
            }
        }
    };

    Json(report)
}

fn list_collections(connection: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    connection
        .prepare(
            "SELECT name FROM sqlite_master \
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
            ORDER BY name LIMIT ?1",
        )?
        .query_map([MAX_LISTED_COLLECTIONS as i64], |row| row.get(0))?
        .collect()
}
