//! Sets up the application's database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, expense::create_expense_table};

/// Create the application's tables if they do not exist.
///
/// Safe to call on an already initialized database.
///
/// # Errors
/// Returns an error if the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
