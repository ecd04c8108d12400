//! Aggregates expenses into a total and per-category totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{category::Category, expense::core::Expense};

/// The total spent over a set of expenses, overall and per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of every amount, rounded to cents.
    pub total: f64,
    /// The sum of amounts for each category label present in the set,
    /// rounded to cents.
    pub per_category: BTreeMap<String, f64>,
}

/// Sum `expenses` overall and by category.
///
/// Only categories that appear in `expenses` have an entry. Expenses with no
/// category are counted under [Category::Other]. Rounding is applied after
/// summing so that rounding errors do not accumulate.
pub fn summarize(expenses: &[Expense]) -> Summary {
    let mut total = 0.0;
    let mut per_category: BTreeMap<String, f64> = BTreeMap::new();

    for expense in expenses {
        total += expense.amount;

        let category = expense
            .category
            .as_deref()
            .unwrap_or(Category::Other.as_str());
        *per_category.entry(category.to_owned()).or_insert(0.0) += expense.amount;
    }

    Summary {
        total: round_to_cents(total),
        per_category: per_category
            .into_iter()
            .map(|(category, amount)| (category, round_to_cents(amount)))
            .collect(),
    }
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
