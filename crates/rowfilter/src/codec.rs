//! JSON encoding of filter maps.
//!
//! A document is an object from field name to a tagged filter:
//!
//! ```json
//! {
//!   "Status": { "FilterType": 1, "Filters": ["Open", "Closed"] },
//!   "Name": { "FilterType": 2, "Filter": "\"*smith*\" | jones" }
//! }
//! ```
//!
//! Decoding reads the integer `FilterType` of each entry first and picks the
//! variant decoder from a fixed table; no type names are involved. Decoding
//! is all-or-nothing: one bad entry fails the whole document.

use std::collections::BTreeMap;

use crate::error::CodecResult;
use crate::filter::{Filter, WireFilter};
use crate::registry::FilterMap;

/// Encodes a filter map as pretty-printed JSON.
pub fn serialize(map: &FilterMap) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

/// Encodes a filter map as single-line JSON.
pub fn serialize_compact(map: &FilterMap) -> CodecResult<String> {
    Ok(serde_json::to_string(map)?)
}

/// Decodes a filter map.
///
/// # Errors
///
/// - Returns `CodecError::Json` if the text is not a JSON object of filter
///   objects.
/// - Returns `CodecError::UnknownKind` if an entry has a tag other than
///   1 (list) or 2 (text).
/// - Returns `CodecError::MissingPayload` if an entry lacks the member its
///   tag requires.
pub fn deserialize(text: &str) -> CodecResult<FilterMap> {
    let wire: BTreeMap<String, WireFilter> = serde_json::from_str(text)?;

    wire.into_iter()
        .map(|(field, entry)| Filter::try_from(entry).map(|filter| (field, filter)))
        .collect()
}
