//! Set-membership filter.

use crate::extract::FieldPath;

use super::{FieldFilter, FilterKind};

/// Accepts values that belong to a set of accepted strings.
///
/// An empty set accepts everything. Accepted values are stored as supplied
/// and keep their insertion order.
///
/// # Case handling
///
/// Values read through a direct property are compared as extracted. Values
/// read through a keyed or nested path are lower-cased before the lookup.
/// Accepted values are never folded, so a keyed lookup only matches
/// lower-case entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    values: Vec<String>,
}

impl ListFilter {
    /// Creates a filter from accepted values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a filter that accepts a single value.
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Returns the accepted values in insertion order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns true if no values are configured (the filter passes everything).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if `value` is one of the accepted values.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// All accepted values joined by `", "`.
    pub fn summary(&self) -> String {
        self.values.join(", ")
    }
}

impl FieldFilter for ListFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::List
    }

    fn matches(&self, value: Option<&str>, path: &FieldPath) -> bool {
        if self.values.is_empty() {
            return true;
        }

        let Some(value) = value else {
            return false;
        };

        if path.is_nested() {
            self.contains(&value.to_lowercase())
        } else {
            self.contains(value)
        }
    }

    fn display(&self) -> String {
        self.values.first().cloned().unwrap_or_default()
    }
}

impl<S: Into<String>> FromIterator<S> for ListFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
