//! Validation of expense payloads sent by clients.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    category::Category,
    expense::core::NewExpense,
    timestamp::{parse_date, start_of_day},
};

/// The expense data sent by a client.
///
/// The required fields are read leniently so that every problem with the
/// payload can be reported at once by [ExpensePayload::validate].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpensePayload {
    /// The amount spent, as a JSON number or a numeric string.
    #[serde(default)]
    pub amount: Value,
    /// One of the category labels.
    #[serde(default)]
    pub category: Option<String>,
    /// The day the money was spent, in `YYYY-MM-DD` form.
    #[serde(default)]
    pub date: Option<String>,
    /// Free text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// How the expense was paid.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Where the money was spent.
    #[serde(default)]
    pub merchant: Option<String>,
}

/// A problem with a single field of an [ExpensePayload].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The name of the field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// Every problem found with an [ExpensePayload], never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

#[cfg(test)]
impl ValidationErrors {
    /// The individual field errors.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` has an error.
    pub fn has_error_for(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{}: {}", error.field, error.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

const FIELD_REQUIRED: &str = "field required";

impl ExpensePayload {
    /// Check the payload and convert it into a [NewExpense].
    ///
    /// The date is placed at the start of its day. The optional text fields
    /// are passed through as they are.
    ///
    /// # Errors
    /// Returns every field error found if the amount is missing, not a
    /// number or not greater than zero, the category is not one of the
    /// known labels, or the date is not a `YYYY-MM-DD` date.
    pub fn validate(self) -> Result<NewExpense, ValidationErrors> {
        let mut errors = Vec::new();

        let amount = validate_amount(&self.amount).map_err(|message| FieldError {
            field: "amount",
            message,
        });
        let category = validate_category(self.category.as_deref()).map_err(|message| {
            FieldError {
                field: "category",
                message,
            }
        });
        let date = validate_date(self.date.as_deref()).map_err(|message| FieldError {
            field: "date",
            message,
        });

        let amount = amount.map_err(|error| errors.push(error)).ok();
        let category = category.map_err(|error| errors.push(error)).ok();
        let date = date.map_err(|error| errors.push(error)).ok();

        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) => Ok(NewExpense {
                amount,
                category,
                date: start_of_day(date),
                notes: self.notes,
                payment_method: self.payment_method,
                merchant: self.merchant,
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}

fn validate_amount(amount: &Value) -> Result<f64, String> {
    let amount = match amount {
        Value::Null => return Err(FIELD_REQUIRED.to_owned()),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        Some(amount) if amount.is_finite() => Err(format!("must be greater than 0, got {amount}")),
        _ => Err("must be a number".to_owned()),
    }
}

fn validate_category(category: Option<&str>) -> Result<Category, String> {
    let category = category.ok_or_else(|| FIELD_REQUIRED.to_owned())?;

    Category::from_str(category).map_err(|error| {
        let labels = Category::ALL
            .iter()
            .map(|category| format!("'{category}'"))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{error}, expected one of {labels}")
    })
}

fn validate_date(date: Option<&str>) -> Result<time::Date, String> {
    let date = date.ok_or_else(|| FIELD_REQUIRED.to_owned())?;

    parse_date(date).map_err(|_| format!("'{date}' is not a date in YYYY-MM-DD format"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{category::Category, expense::core::NewExpense};

    use super::ExpensePayload;

    fn payload(amount: serde_json::Value, category: &str, date: &str) -> ExpensePayload {
        ExpensePayload {
            amount,
            category: Some(category.to_owned()),
            date: Some(date.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_payload_is_normalized() {
        let payload = ExpensePayload {
            notes: Some("Nasi goreng".to_owned()),
            payment_method: Some("e-wallet".to_owned()),
            merchant: Some("Warung".to_owned()),
            ..payload(json!(25000), "Makanan & Minuman", "2024-03-15")
        };

        let got = payload.validate();

        assert_eq!(
            got,
            Ok(NewExpense {
                amount: 25000.0,
                category: Category::Food,
                date: datetime!(2024-03-15 0:00:00),
                notes: Some("Nasi goreng".to_owned()),
                payment_method: Some("e-wallet".to_owned()),
                merchant: Some("Warung".to_owned()),
            })
        );
    }

    #[test]
    fn accepts_numeric_string_amount() {
        let got = payload(json!("12.75"), "Transportasi", "2024-01-01").validate();

        assert_eq!(got.map(|expense| expense.amount), Ok(12.75));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [json!(0), json!(-5), json!(-0.01)] {
            let errors = payload(amount.clone(), "Transportasi", "2024-01-01")
                .validate()
                .expect_err("non-positive amount should be rejected");

            assert!(errors.has_error_for("amount"), "{amount} was accepted");
            assert_eq!(errors.field_errors().len(), 1);
        }
    }

    #[test]
    fn rejects_non_numeric_amounts() {
        for amount in [json!("lots"), json!(true), json!([1]), json!({"value": 1})] {
            let errors = payload(amount.clone(), "Transportasi", "2024-01-01")
                .validate()
                .expect_err("non-numeric amount should be rejected");

            assert!(errors.has_error_for("amount"), "{amount} was accepted");
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let errors = payload(json!(10), "Snacks", "2024-01-01")
            .validate()
            .expect_err("unknown category should be rejected");

        assert!(errors.has_error_for("category"));
        assert!(errors.to_string().contains("'Snacks' is not a valid category"));
    }

    #[test]
    fn rejects_bad_dates() {
        for date in ["2024-02-30", "15/03/2024", "2024-3-5", ""] {
            let errors = payload(json!(10), "Belanja", date)
                .validate()
                .expect_err("bad date should be rejected");

            assert!(errors.has_error_for("date"), "{date:?} was accepted");
        }
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = payload(json!(-1), "Snacks", "not a date")
            .validate()
            .expect_err("payload should be rejected");

        assert_eq!(errors.field_errors().len(), 3);
        let message = errors.to_string();
        assert!(message.starts_with("amount: must be greater than 0"), "{message}");
        assert!(message.contains("; category: "), "{message}");
        assert!(message.contains("; date: "), "{message}");
    }

    #[test]
    fn reports_missing_fields() {
        let errors = ExpensePayload::default()
            .validate()
            .expect_err("empty payload should be rejected");

        assert_eq!(
            errors.to_string(),
            "amount: field required; category: field required; date: field required"
        );
    }
}
