//! Per-field filter variants and the text filter expression language.
//!
//! # Variants
//!
//! - [`ListFilter`] - accepts values from a set of accepted strings
//! - [`TextFilter`] - free text, either a plain containment test or a macro
//!   expression
//!
//! Both implement [`FieldFilter`], and [`Filter`] is the closed union the
//! registry stores.
//!
//! # Macro Syntax
//!
//! A text filter is a macro expression if it contains `&`, `|`, `""` or a
//! quoted segment. It is then split into blocks at every `&` / `|`:
//!
//! - `""` - the value is empty
//! - `"*foo*"` - the value contains `foo`
//! - `"foo"` - the value is exactly `foo`
//! - `foo` - the value contains `foo`
//!
//! Blocks fold strictly left to right starting from `true`; `&` and `|`
//! have no precedence over each other and there is no grouping.
//!
//! Anything else is a case-insensitive containment test of the whole string.
//!
//! # Example
//!
//! ```
//! use rowfilter::extract::FieldPath;
//! use rowfilter::filter::{FieldFilter, Filter, FilterKind};
//!
//! let filter = Filter::create(FilterKind::Text, "\"open\" | \"*review*\"");
//! let path = FieldPath::parse("Status");
//!
//! assert!(filter.matches(Some("Open"), &path));
//! assert!(filter.matches(Some("In Review"), &path));
//! assert!(!filter.matches(Some("Closed"), &path));
//! assert!(!filter.matches(None, &path));
//! ```

mod ast;
mod evaluator;
mod lexer;
mod list;
mod parser;
mod text;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::extract::FieldPath;

pub use ast::{BlockPattern, CombineOp, MacroBlock, TextQuery, EMPTY_MARKER};
pub use evaluator::{apply_macro, apply_macro_block, apply_plain, apply_query};
pub use lexer::BlockScanner;
pub use list::ListFilter;
pub use parser::MacroParser;
pub use text::TextFilter;

/// Identifies a filter variant. The discriminant is the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterKind {
    /// Set membership ([`ListFilter`]).
    List = 1,
    /// Free text or macro expression ([`TextFilter`]).
    Text = 2,
}

impl FilterKind {
    /// Returns the wire tag of this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a kind by wire tag. Tag `0` is reserved and rejected.
    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(FilterKind::List),
            2 => Some(FilterKind::Text),
            _ => None,
        }
    }

    /// Returns a lowercase name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::List => "list",
            FilterKind::Text => "text",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The capability every filter variant provides.
pub trait FieldFilter {
    /// The variant kind.
    fn kind(&self) -> FilterKind;

    /// Tests an extracted value.
    ///
    /// `None` means the field was not found on the object; `path` is the
    /// path the value was read through.
    fn matches(&self, value: Option<&str>, path: &FieldPath) -> bool;

    /// Short text for summaries.
    fn display(&self) -> String;
}

/// A filter stored for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireFilter", into = "WireFilter")]
pub enum Filter {
    /// Set membership.
    List(ListFilter),
    /// Free text or macro expression.
    Text(TextFilter),
}

impl Filter {
    /// Builds a filter of the given kind from a raw value.
    ///
    /// A list filter accepts exactly `raw`; a text filter parses `raw`.
    /// Every string is a valid filter.
    pub fn create(kind: FilterKind, raw: &str) -> Self {
        match kind {
            FilterKind::List => Filter::List(ListFilter::single(raw)),
            FilterKind::Text => Filter::Text(TextFilter::new(raw)),
        }
    }

    /// Returns the list filter, if this is one.
    pub fn as_list(&self) -> Option<&ListFilter> {
        match self {
            Filter::List(list) => Some(list),
            Filter::Text(_) => None,
        }
    }

    /// Returns the text filter, if this is one.
    pub fn as_text(&self) -> Option<&TextFilter> {
        match self {
            Filter::Text(text) => Some(text),
            Filter::List(_) => None,
        }
    }
}

impl FieldFilter for Filter {
    fn kind(&self) -> FilterKind {
        match self {
            Filter::List(list) => list.kind(),
            Filter::Text(text) => text.kind(),
        }
    }

    fn matches(&self, value: Option<&str>, path: &FieldPath) -> bool {
        match self {
            Filter::List(list) => list.matches(value, path),
            Filter::Text(text) => text.matches(value, path),
        }
    }

    fn display(&self) -> String {
        match self {
            Filter::List(list) => list.display(),
            Filter::Text(text) => text.display(),
        }
    }
}

impl From<ListFilter> for Filter {
    fn from(list: ListFilter) -> Self {
        Filter::List(list)
    }
}

impl From<TextFilter> for Filter {
    fn from(text: TextFilter) -> Self {
        Filter::Text(text)
    }
}

/// On-the-wire shape of a filter: `{"FilterType": 1, "Filters": [...]}` or
/// `{"FilterType": 2, "Filter": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireFilter {
    #[serde(rename = "FilterType")]
    kind: u64,

    #[serde(
        rename = "Filters",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    filters: Option<Vec<String>>,

    #[serde(rename = "Filter", default, skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
}

impl TryFrom<WireFilter> for Filter {
    type Error = CodecError;

    fn try_from(wire: WireFilter) -> Result<Self, Self::Error> {
        let kind =
            FilterKind::from_tag(wire.kind).ok_or(CodecError::UnknownKind { tag: wire.kind })?;

        match kind {
            FilterKind::List => {
                let values = wire
                    .filters
                    .ok_or_else(|| CodecError::missing_payload(kind, "Filters"))?;
                Ok(Filter::List(ListFilter::new(values)))
            }
            FilterKind::Text => {
                let raw = wire
                    .filter
                    .ok_or_else(|| CodecError::missing_payload(kind, "Filter"))?;
                Ok(Filter::Text(TextFilter::new(raw)))
            }
        }
    }
}

impl From<Filter> for WireFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::List(list) => WireFilter {
                kind: u64::from(FilterKind::List.tag()),
                filters: Some(list.values().to_vec()),
                filter: None,
            },
            Filter::Text(text) => WireFilter {
                kind: u64::from(FilterKind::Text.tag()),
                filters: None,
                filter: Some(text.raw().to_string()),
            },
        }
    }
}
