//! Conversions between calendar dates, timestamps and their text forms.
//!
//! Timestamps are written and rendered as ISO-8601 text without an offset,
//! e.g. `2024-03-15T00:00:00`. The store may also hold bare dates or
//! fractional seconds written by other tools, so store comparisons go through
//! SQLite's `datetime()` rather than raw text.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::BorrowedFormatItem,
    macros::{format_description, time},
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The form timestamps are written in, e.g. `2024-03-15T09:30:00`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// The forms accepted when reading timestamps back from the store.
const STORED_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
/// Returns an error if `text` is not a valid date in that exact form.
pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, DATE_FORMAT)
}

/// The first instant of `date`.
pub fn start_of_day(date: Date) -> PrimitiveDateTime {
    date.midnight()
}

/// The last instant of `date` at the precision timestamps are stored with.
pub fn end_of_day(date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, time!(23:59:59))
}

/// The current UTC time, truncated to whole seconds.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    let now = PrimitiveDateTime::new(now.date(), now.time());

    now.replace_nanosecond(0).unwrap_or(now)
}

/// Render `timestamp` as ISO-8601 text with second precision.
///
/// # Errors
/// Returns a [time::error::Format] if the timestamp cannot be formatted,
/// e.g. its year does not fit in four digits.
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> Result<String, time::error::Format> {
    timestamp.format(TIMESTAMP_FORMAT)
}

/// Parse a timestamp read back from the store.
///
/// Accepts full timestamps (optionally with fractional seconds) and bare
/// dates. A bare date is read as the start of that day.
///
/// # Errors
/// Returns the timestamp parse error if `text` is neither form.
pub fn parse_stored_timestamp(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    match PrimitiveDateTime::parse(text, STORED_TIMESTAMP_FORMAT) {
        Ok(timestamp) => Ok(timestamp),
        Err(error) => parse_date(text).map(start_of_day).map_err(|_| error),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::{
        end_of_day, format_timestamp, now_utc, parse_date, parse_stored_timestamp, start_of_day,
    };

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2024-03-15"), Ok(date!(2024 - 03 - 15)));
    }

    #[test]
    fn rejects_malformed_dates() {
        for text in ["2024-3-15", "15-03-2024", "2024-02-30", "yesterday", ""] {
            assert!(parse_date(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn day_bounds() {
        let day = date!(2024 - 02 - 28);

        assert_eq!(start_of_day(day), datetime!(2024-02-28 0:00:00));
        assert_eq!(end_of_day(day), datetime!(2024-02-28 23:59:59));
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 7:08:09)).unwrap(),
            "2024-03-05T07:08:09"
        );
    }

    #[test]
    fn drops_subseconds_when_formatting() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 7:08:09.75)).unwrap(),
            "2024-03-05T07:08:09"
        );
    }

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = format_timestamp(datetime!(2024-09-30 23:59:59)).unwrap();
        let later = format_timestamp(datetime!(2024-10-01 0:00:00)).unwrap();

        assert!(earlier < later);
    }

    #[test]
    fn reads_back_stored_forms() {
        assert_eq!(
            parse_stored_timestamp("2024-03-15T10:11:12"),
            Ok(datetime!(2024-03-15 10:11:12))
        );
        assert_eq!(
            parse_stored_timestamp("2024-03-15T10:11:12.5"),
            Ok(datetime!(2024-03-15 10:11:12.5))
        );
        assert_eq!(
            parse_stored_timestamp("2024-03-15"),
            Ok(datetime!(2024-03-15 0:00:00))
        );
        assert!(parse_stored_timestamp("not a date").is_err());
    }

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(now_utc().nanosecond(), 0);
    }
}
