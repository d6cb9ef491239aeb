//! Per-column row filtering for tabular views.
//!
//! A filter row above a table holds one filter per column. This crate
//! provides:
//!
//! - [`filter`] - the list and text filter variants and the text macro
//!   language (`&`, `|`, `""`, `"*x*"`, `"x"`)
//! - [`extract`] - resolution of `:`-separated field paths on row objects
//! - [`registry`] - the per-row registry that combines filters with AND and
//!   notifies observers of changes
//! - [`codec`] - the JSON document format for saving and restoring filters
//!
//! # Example
//!
//! ```
//! use rowfilter::{FilterKind, FilterRegistry, SourceAccessor};
//! use serde_json::json;
//!
//! let mut registry = FilterRegistry::new();
//! registry.add_column_filter("Tags:team", "core", FilterKind::List);
//!
//! let saved = registry.save_json().unwrap();
//!
//! let mut restored = FilterRegistry::new();
//! restored.load_json(&saved).unwrap();
//!
//! let row = json!({"Tags": {"team": "Core"}});
//! assert!(restored.apply_total_filter(&row, &SourceAccessor));
//! ```

pub mod codec;
pub mod error;
pub mod extract;
pub mod filter;
pub mod registry;

pub use error::{CodecError, CodecResult};
pub use extract::{FieldAccessor, FieldPath, FieldSource, FieldTable, FieldValue, SourceAccessor};
pub use filter::{FieldFilter, Filter, FilterKind, ListFilter, TextFilter};
pub use registry::{FilterMap, FilterRegistry, ObserverId, RegistryEvent};
