//! The API endpoints URIs.

/// The root route, reports that the server is up.
pub const ROOT: &str = "/";
/// The route reporting the state of the database connection.
pub const STORE_REPORT: &str = "/test";
/// The route to create and list expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for the expense summary.
pub const SUMMARY: &str = "/api/summary";
