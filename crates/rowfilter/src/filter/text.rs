//! Text and macro filter.

use crate::extract::FieldPath;

use super::ast::{MacroBlock, TextQuery};
use super::evaluator::apply_query;
use super::parser::MacroParser;
use super::{FieldFilter, FilterKind};

/// A free-text filter.
///
/// The raw string is kept as entered; the parsed query is derived from it
/// once at construction and never changes.
#[derive(Debug, Clone)]
pub struct TextFilter {
    raw: String,
    query: TextQuery,
}

impl TextFilter {
    /// Creates a filter from a raw filter string.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let query = MacroParser::parse(&raw);
        Self { raw, query }
    }

    /// Returns the raw filter string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed query.
    pub fn query(&self) -> &TextQuery {
        &self.query
    }

    /// Returns true if the filter string uses macro syntax.
    pub fn is_macro(&self) -> bool {
        self.query.is_macro()
    }

    /// Returns the macro blocks (empty for non-macro filters).
    pub fn blocks(&self) -> &[MacroBlock] {
        self.query.blocks()
    }

    /// Returns true if the filter string is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new(String::new())
    }
}

// The query is a function of the raw string.
impl PartialEq for TextFilter {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TextFilter {}

impl FieldFilter for TextFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Text
    }

    fn matches(&self, value: Option<&str>, _path: &FieldPath) -> bool {
        if self.raw.is_empty() {
            return true;
        }

        match value {
            Some(value) => apply_query(&self.query, &value.to_lowercase()),
            None => false,
        }
    }

    fn display(&self) -> String {
        self.raw.clone()
    }
}

impl From<&str> for TextFilter {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TextFilter {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
