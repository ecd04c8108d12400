//! The closed set of expense categories.

use std::{fmt::Display, str::FromStr};

/// The category an expense belongs to.
///
/// Categories are a fixed list, clients cannot create their own. The text
/// labels are what clients send and what the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Food and drinks.
    Food,
    /// Public transport, fuel, taxis, etc.
    Transport,
    /// General shopping.
    Shopping,
    /// Utility bills, rent and subscriptions.
    Bills,
    /// Medicine and doctor visits.
    Health,
    /// Movies, games, outings.
    Entertainment,
    /// Courses, books and school fees.
    Education,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Health,
        Category::Entertainment,
        Category::Education,
        Category::Other,
    ];

    /// The text label for the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Makanan & Minuman",
            Category::Transport => "Transportasi",
            Category::Shopping => "Belanja",
            Category::Bills => "Tagihan",
            Category::Health => "Kesehatan",
            Category::Entertainment => "Hiburan",
            Category::Education => "Pendidikan",
            Category::Other => "Lainnya",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a label is not one of the known categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Parse a category label.
    ///
    /// Matching is exact: no trimming and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Category, UnknownCategory};

    #[test]
    fn parses_every_label() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert_eq!(
            Category::from_str("Snacks"),
            Err(UnknownCategory("Snacks".to_owned()))
        );
    }

    #[test]
    fn matching_is_case_sensitive_and_untrimmed() {
        assert!(Category::from_str("transportasi").is_err());
        assert!(Category::from_str(" Transportasi").is_err());
        assert!(Category::from_str("Transportasi ").is_err());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Category::Food.to_string(), "Makanan & Minuman");
        assert_eq!(Category::Other.to_string(), "Lainnya");
    }
}
