//! Store filters for expenses and the query that applies them.

use std::ops::Bound;

use rusqlite::{Connection, params_from_iter, types::Value};
use time::{Date, Month, PrimitiveDateTime};

use crate::{
    Error,
    expense::core::{EXPENSE_COLUMNS, Expense, map_expense_row},
    timestamp::{end_of_day, format_timestamp, start_of_day},
};

/// Which expenses a query should match.
///
/// An expense matches when it satisfies every constraint. The date bounds
/// apply to [Expense::date].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFilter {
    /// Only match expenses with exactly this category label.
    pub category: Option<String>,
    /// The lower bound on the expense date.
    pub date_from: Bound<PrimitiveDateTime>,
    /// The upper bound on the expense date.
    pub date_to: Bound<PrimitiveDateTime>,
}

impl ExpenseFilter {
    /// A filter that matches every expense.
    pub fn all() -> Self {
        Self {
            category: None,
            date_from: Bound::Unbounded,
            date_to: Bound::Unbounded,
        }
    }

    /// Build the filter for listing expenses.
    ///
    /// `start` and `end` are inclusive and independent of each other:
    /// `start` matches from the start of that day and `end` up to the end of
    /// that day. An empty `category` is treated as no category.
    pub fn for_listing(category: Option<&str>, start: Option<Date>, end: Option<Date>) -> Self {
        Self {
            category: category
                .filter(|category| !category.is_empty())
                .map(str::to_owned),
            date_from: start
                .map(|start| Bound::Included(start_of_day(start)))
                .unwrap_or(Bound::Unbounded),
            date_to: end
                .map(|end| Bound::Included(end_of_day(end)))
                .unwrap_or(Bound::Unbounded),
        }
    }

    /// Build the filter for every expense in a calendar month.
    ///
    /// The range runs from the first day of the month up to, but not
    /// including, the first day of the next month. December rolls over into
    /// January of the following year.
    ///
    /// # Errors
    /// Returns [Error::InvalidSummaryPeriod] if `month` is not in 1 to 12 or
    /// the year is out of range.
    pub fn for_month(month: u8, year: i32) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| {
            Error::InvalidSummaryPeriod(format!("month must be between 1 and 12, got {month}"))
        })?;

        // Checked before computing the next month so `year + 1` cannot overflow.
        let first_day = first_day_of(year, month)?;

        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            month => (year, month.next()),
        };
        let first_day_of_next_month = first_day_of(next_year, next_month)?;

        Ok(Self {
            category: None,
            date_from: Bound::Included(start_of_day(first_day)),
            date_to: Bound::Excluded(start_of_day(first_day_of_next_month)),
        })
    }

    /// Whether the filter places no constraints at all.
    #[cfg(test)]
    fn is_match_all(&self) -> bool {
        self.category.is_none()
            && self.date_from == Bound::Unbounded
            && self.date_to == Bound::Unbounded
    }

    /// The SQL `WHERE` clause for this filter and its positional parameters.
    ///
    /// The clause is empty when the filter matches everything. Dates are
    /// compared through `datetime()` so bare dates and fractional seconds in
    /// the store compare by their instant rather than as text.
    ///
    /// # Errors
    /// Returns [Error::TimestampFormat] if a bound cannot be written as text.
    fn where_clause(&self) -> Result<(String, Vec<Value>), Error> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(category) = &self.category {
            conditions.push("category = ?");
            params.push(Value::Text(category.clone()));
        }

        let bounds = [
            (self.date_from, "datetime(date) >= datetime(?)", "datetime(date) > datetime(?)"),
            (self.date_to, "datetime(date) <= datetime(?)", "datetime(date) < datetime(?)"),
        ];

        for (bound, included, excluded) in bounds {
            let (condition, timestamp) = match bound {
                Bound::Included(timestamp) => (included, timestamp),
                Bound::Excluded(timestamp) => (excluded, timestamp),
                Bound::Unbounded => continue,
            };

            conditions.push(condition);
            params.push(Value::Text(format_timestamp(timestamp)?));
        }

        if conditions.is_empty() {
            Ok((String::new(), params))
        } else {
            Ok((format!("WHERE {}", conditions.join(" AND ")), params))
        }
    }
}

fn first_day_of(year: i32, month: Month) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, 1).map_err(|error| {
        Error::InvalidSummaryPeriod(format!("year {year} is out of range: {error}"))
    })
}

/// Get the expenses matching `filter`, in the order they were stored.
///
/// At most `limit` expenses are returned, or all of them if `limit` is
/// `None`.
///
/// # Errors
/// Returns [Error::TimestampFormat] if a date bound cannot be written as
/// text, or [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Expense row mapping fails
pub fn query_expenses(
    filter: &ExpenseFilter,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut params) = filter.where_clause()?;
    // SQLite treats a negative limit as no limit.
    params.push(Value::Integer(limit.map_or(-1, i64::from)));

    let query =
        format!("SELECT {EXPENSE_COLUMNS} FROM expense {where_clause} ORDER BY id ASC LIMIT ?");

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_expense_row)?
        .map(|expense_result| expense_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod filter_tests {
    use std::ops::Bound;

    use time::macros::{date, datetime};

    use crate::Error;

    use super::ExpenseFilter;

    #[test]
    fn no_parameters_match_all() {
        let filter = ExpenseFilter::for_listing(None, None, None);

        assert_eq!(filter, ExpenseFilter::all());
        assert!(filter.is_match_all());
    }

    #[test]
    fn empty_category_is_ignored() {
        let filter = ExpenseFilter::for_listing(Some(""), None, None);

        assert!(filter.is_match_all());
    }

    #[test]
    fn listing_bounds_are_inclusive_whole_days() {
        let filter = ExpenseFilter::for_listing(
            Some("Belanja"),
            Some(date!(2024 - 02 - 01)),
            Some(date!(2024 - 02 - 28)),
        );

        assert_eq!(
            filter,
            ExpenseFilter {
                category: Some("Belanja".to_owned()),
                date_from: Bound::Included(datetime!(2024-02-01 0:00:00)),
                date_to: Bound::Included(datetime!(2024-02-28 23:59:59)),
            }
        );
    }

    #[test]
    fn listing_bounds_are_independent() {
        let filter = ExpenseFilter::for_listing(None, None, Some(date!(2024 - 02 - 28)));

        assert_eq!(filter.date_from, Bound::Unbounded);
        assert_eq!(
            filter.date_to,
            Bound::Included(datetime!(2024-02-28 23:59:59))
        );
    }

    #[test]
    fn month_range_is_half_open() {
        let filter = ExpenseFilter::for_month(3, 2024).unwrap();

        assert_eq!(
            filter.date_from,
            Bound::Included(datetime!(2024-03-01 0:00:00))
        );
        assert_eq!(
            filter.date_to,
            Bound::Excluded(datetime!(2024-04-01 0:00:00))
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        let filter = ExpenseFilter::for_month(12, 2024).unwrap();

        assert_eq!(
            filter.date_from,
            Bound::Included(datetime!(2024-12-01 0:00:00))
        );
        assert_eq!(
            filter.date_to,
            Bound::Excluded(datetime!(2025-01-01 0:00:00))
        );
    }

    #[test]
    fn rejects_invalid_months() {
        for month in [0, 13, 255] {
            assert!(
                matches!(
                    ExpenseFilter::for_month(month, 2024),
                    Err(Error::InvalidSummaryPeriod(_))
                ),
                "month {month} was accepted"
            );
        }
    }

    #[test]
    fn where_clause_is_empty_for_match_all() {
        let (clause, params) = ExpenseFilter::all().where_clause().unwrap();

        assert_eq!(clause, "");
        assert!(params.is_empty());
    }
}
