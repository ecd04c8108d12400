//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row, types::Type};
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::Category,
    timestamp::{format_timestamp, now_utc, parse_stored_timestamp},
};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type the store uses to identify expenses.
pub type ExpenseId = i64;

/// A validated expense that has not been stored yet.
///
/// Use [crate::ExpensePayload::validate] to create one from client input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// How much was spent, always greater than zero.
    pub amount: f64,
    /// What the money was spent on.
    pub category: Category,
    /// The day the money was spent, at the start of that day.
    pub date: PrimitiveDateTime,
    /// Free text notes.
    pub notes: Option<String>,
    /// How the expense was paid, e.g. "cash", "e-wallet", "bank".
    pub payment_method: Option<String>,
    /// Where the money was spent.
    pub merchant: Option<String>,
}

/// An expense as held by the store.
///
/// The category is kept as the stored text since the store may hold
/// records that were not written through this application.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID assigned by the store.
    pub id: ExpenseId,
    /// How much was spent.
    pub amount: f64,
    /// The category label, if the record has one.
    pub category: Option<String>,
    /// When the money was spent.
    pub date: PrimitiveDateTime,
    /// Free text notes.
    pub notes: Option<String>,
    /// How the expense was paid.
    pub payment_method: Option<String>,
    /// Where the money was spent.
    pub merchant: Option<String>,
    /// When the record was created.
    pub created_at: Option<PrimitiveDateTime>,
    /// When the record was last changed.
    pub updated_at: Option<PrimitiveDateTime>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the expense table, in the order [map_expense_row] expects.
pub(crate) const EXPENSE_COLUMNS: &str =
    "id, amount, category, date, notes, payment_method, merchant, created_at, updated_at";

/// Insert `expense` into the store and return the ID the store assigned.
///
/// The creation and update timestamps are set to the current UTC time.
///
/// # Errors
/// This function will return a:
/// - [Error::TimestampFormat] if a timestamp cannot be written as text,
/// - or [Error::SqlError] if there is some SQL error.
pub fn create_expense(expense: NewExpense, connection: &Connection) -> Result<ExpenseId, Error> {
    let now = format_timestamp(now_utc())?;
    let date = format_timestamp(expense.date)?;

    let id = connection
        .prepare(
            "INSERT INTO expense (amount, category, date, notes, payment_method, merchant, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                expense.amount,
                expense.category.as_str(),
                date,
                expense.notes,
                expense.payment_method,
                expense.merchant,
                now,
            ),
            |row| row.get(0),
        )?;

    tracing::debug!("stored expense {id}");

    Ok(id)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if `id` does not refer to an
/// expense or there is some other SQL error.
#[cfg(test)]
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!("SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                category TEXT,
                date TEXT NOT NULL,
                notes TEXT,
                payment_method TEXT,
                merchant TEXT,
                created_at TEXT,
                updated_at TEXT
                )",
        (),
    )?;

    // Matches the normalised date comparison used by the listing and the
    // monthly summary.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date_category
         ON expense(datetime(date), category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
///
/// The row must contain the columns in [EXPENSE_COLUMNS], in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        date: get_timestamp(row, 3)?,
        notes: row.get(4)?,
        payment_method: row.get(5)?,
        merchant: row.get(6)?,
        created_at: get_optional_timestamp(row, 7)?,
        updated_at: get_optional_timestamp(row, 8)?,
    })
}

fn get_timestamp(row: &Row, index: usize) -> Result<PrimitiveDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    parse_stored_timestamp(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

fn get_optional_timestamp(
    row: &Row,
    index: usize,
) -> Result<Option<PrimitiveDateTime>, rusqlite::Error> {
    let text: Option<String> = row.get(index)?;

    text.map(|text| {
        parse_stored_timestamp(&text).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
        })
    })
    .transpose()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        category::Category,
        db::initialize,
        expense::core::{NewExpense, create_expense, get_expense},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_expense(amount: f64) -> NewExpense {
        NewExpense {
            amount,
            category: Category::Food,
            date: datetime!(2024-03-15 0:00:00),
            notes: Some("lunch".to_owned()),
            payment_method: Some("cash".to_owned()),
            merchant: None,
        }
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let id = create_expense(new_expense(12.5), &conn).expect("Could not create expense");

        let expense = get_expense(id, &conn).unwrap();
        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.category.as_deref(), Some("Makanan & Minuman"));
        assert_eq!(expense.date, datetime!(2024-03-15 0:00:00));
        assert_eq!(expense.notes.as_deref(), Some("lunch"));
        assert_eq!(expense.payment_method.as_deref(), Some("cash"));
        assert_eq!(expense.merchant, None);
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let conn = get_test_connection();

        let first = create_expense(new_expense(1.0), &conn).unwrap();
        let second = create_expense(new_expense(2.0), &conn).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn create_sets_timestamps() {
        let conn = get_test_connection();

        let id = create_expense(new_expense(3.0), &conn).unwrap();

        let expense = get_expense(id, &conn).unwrap();
        assert!(expense.created_at.is_some());
        assert_eq!(expense.created_at, expense.updated_at);
    }

    #[test]
    fn reads_date_only_values_as_start_of_day() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO expense (amount, category, date) VALUES (5.0, 'Belanja', '2024-03-15')",
            (),
        )
        .unwrap();

        let expense = get_expense(1, &conn).unwrap();

        assert_eq!(expense.date, datetime!(2024-03-15 0:00:00));
        assert_eq!(expense.created_at, None);
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        let result = get_expense(42, &conn);

        assert_eq!(
            result,
            Err(Error::SqlError(rusqlite::Error::QueryReturnedNoRows))
        );
    }
}
