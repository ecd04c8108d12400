//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// A human readable name for the database, e.g. its file path.
    pub database_name: String,

    /// The largest number of expenses a single listing may return.
    ///
    /// `None` means client supplied limits are used as they are.
    pub max_list_limit: Option<u32>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        database_name: &str,
        max_list_limit: Option<u32>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            database_name: database_name.to_owned(),
            max_list_limit,
        })
    }
}
