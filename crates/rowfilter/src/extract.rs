//! Field path resolution against arbitrary objects.
//!
//! A field path is a `:`-separated string:
//!
//! - `Name` - the `Name` property, in string form
//! - `Tags:Color` - the `Tags` property is a string map; look up `Color`
//! - `Meta:Row:Color` - the `Meta` property is a map of string maps
//!
//! Any other number of segments resolves to nothing. A missing property,
//! a missing key, or a value of the wrong shape for the path is "not found"
//! (`None`), which is distinct from an empty string.
//!
//! Objects expose their properties either by implementing [`FieldSource`]
//! or through a [`FieldTable`] of named getters.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use rowfilter::extract::{FieldAccessor, FieldPath, FieldTable, FieldValue};
//!
//! struct Person {
//!     name: String,
//!     tags: HashMap<String, String>,
//! }
//!
//! let table = FieldTable::new()
//!     .with("Name", |p: &Person| Some(FieldValue::text(&p.name)))
//!     .with("Tags", |p: &Person| Some(FieldValue::Map(&p.tags)));
//!
//! let person = Person {
//!     name: "Ada".to_string(),
//!     tags: HashMap::from([("team".to_string(), "core".to_string())]),
//! };
//!
//! assert_eq!(table.resolve(&person, &FieldPath::parse("Name")), Some("Ada".to_string()));
//! assert_eq!(table.resolve(&person, &FieldPath::parse("Tags:team")), Some("core".to_string()));
//! assert_eq!(table.resolve(&person, &FieldPath::parse("Tags:role")), None);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use strsim::levenshtein;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = ':';

/// Maximum Levenshtein distance to consider a property name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// A property read directly.
    Direct(String),
    /// A string-map property and a key into it.
    Keyed(String, String),
    /// A map-of-maps property and two keys.
    Nested(String, String, String),
    /// A path with more than three segments. Never resolves.
    Unsupported(String),
}

impl FieldPath {
    /// Parses a path by splitting on `:`.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        match segments.as_slice() {
            [property] => FieldPath::Direct(property.to_string()),
            [property, key] => FieldPath::Keyed(property.to_string(), key.to_string()),
            [property, outer, inner] => FieldPath::Nested(
                property.to_string(),
                outer.to_string(),
                inner.to_string(),
            ),
            _ => FieldPath::Unsupported(path.to_string()),
        }
    }

    /// Returns the top-level property name, if the path can resolve.
    pub fn property(&self) -> Option<&str> {
        match self {
            FieldPath::Direct(p) | FieldPath::Keyed(p, _) | FieldPath::Nested(p, _, _) => Some(p),
            FieldPath::Unsupported(_) => None,
        }
    }

    /// Returns the number of `:`-separated segments.
    pub fn depth(&self) -> usize {
        match self {
            FieldPath::Direct(_) => 1,
            FieldPath::Keyed(..) => 2,
            FieldPath::Nested(..) => 3,
            FieldPath::Unsupported(raw) => raw.split(PATH_SEPARATOR).count(),
        }
    }

    /// Returns true for keyed and nested paths.
    pub fn is_nested(&self) -> bool {
        matches!(self, FieldPath::Keyed(..) | FieldPath::Nested(..))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Direct(p) => write!(f, "{}", p),
            FieldPath::Keyed(p, k) => write!(f, "{}:{}", p, k),
            FieldPath::Nested(p, a, b) => write!(f, "{}:{}:{}", p, a, b),
            FieldPath::Unsupported(raw) => f.write_str(raw),
        }
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::parse(path)
    }
}

/// The value of a single property, as handed out by a getter.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    /// A scalar already in string form.
    Text(Cow<'a, str>),
    /// A string-keyed map of strings.
    Map(&'a HashMap<String, String>),
    /// A string-keyed map of string maps.
    NestedMap(&'a HashMap<String, HashMap<String, String>>),
    /// A JSON value.
    Json(&'a Value),
}

impl<'a> FieldValue<'a> {
    /// A borrowed scalar.
    pub fn text(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }

    /// A scalar rendered through [`ToString`].
    pub fn display(value: impl ToString) -> Self {
        FieldValue::Text(Cow::Owned(value.to_string()))
    }

    /// The string form of a scalar. Maps have none.
    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text.into_owned()),
            FieldValue::Map(_) | FieldValue::NestedMap(_) => None,
            FieldValue::Json(value) => json_scalar(value),
        }
    }

    /// Looks up `key` in a string map.
    pub fn get(self, key: &str) -> Option<String> {
        match self {
            FieldValue::Map(map) => map.get(key).cloned(),
            FieldValue::Json(value) => value.get(key)?.as_str().map(str::to_string),
            FieldValue::Text(_) | FieldValue::NestedMap(_) => None,
        }
    }

    /// Looks up `outer` then `inner` in a map of string maps.
    pub fn get_nested(self, outer: &str, inner: &str) -> Option<String> {
        match self {
            FieldValue::NestedMap(map) => map.get(outer)?.get(inner).cloned(),
            FieldValue::Json(value) => value.get(outer)?.get(inner)?.as_str().map(str::to_string),
            FieldValue::Text(_) | FieldValue::Map(_) => None,
        }
    }
}

/// String form of a JSON scalar. Null, arrays and objects have none.
fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Resolves a path given a way to look up top-level properties.
fn resolve_path<'a>(
    path: &FieldPath,
    lookup: impl FnOnce(&str) -> Option<FieldValue<'a>>,
) -> Option<String> {
    match path {
        FieldPath::Direct(property) => lookup(property)?.into_text(),
        FieldPath::Keyed(property, key) => lookup(property)?.get(key),
        FieldPath::Nested(property, outer, inner) => lookup(property)?.get_nested(outer, inner),
        FieldPath::Unsupported(_) => None,
    }
}

/// An object that can look up its own properties by name.
pub trait FieldSource {
    /// Returns the named property, or `None` if the object has no such property.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl FieldSource for Value {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.as_object()?.get(name).map(FieldValue::Json)
    }
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.get(name).map(|v| FieldValue::text(v))
    }
}

/// Resolves field paths on objects of type `T`.
pub trait FieldAccessor<T: ?Sized> {
    /// Resolves `path` on `object` to a string, or `None` if not found.
    fn resolve(&self, object: &T, path: &FieldPath) -> Option<String>;
}

/// Accessor for objects that implement [`FieldSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceAccessor;

impl<T: FieldSource + ?Sized> FieldAccessor<T> for SourceAccessor {
    fn resolve(&self, object: &T, path: &FieldPath) -> Option<String> {
        extract(object, path)
    }
}

/// Resolves `path` on an object that implements [`FieldSource`].
pub fn extract<T: FieldSource + ?Sized>(object: &T, path: &FieldPath) -> Option<String> {
    resolve_path(path, |name| object.field(name))
}

type Getter<T> = Box<dyn for<'a> Fn(&'a T) -> Option<FieldValue<'a>>>;

/// A table of named property getters, built once at startup.
pub struct FieldTable<T> {
    getters: HashMap<String, Getter<T>>,
}

impl<T> FieldTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            getters: HashMap::new(),
        }
    }

    /// Registers a getter, replacing any previous getter with the same name.
    pub fn with<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> Option<FieldValue<'a>> + 'static,
    {
        self.insert(name, getter);
        self
    }

    /// Registers a getter in place.
    pub fn insert<F>(&mut self, name: impl Into<String>, getter: F)
    where
        F: for<'a> Fn(&'a T) -> Option<FieldValue<'a>> + 'static,
    {
        self.getters.insert(name.into(), Box::new(getter));
    }

    /// Returns true if a getter is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.getters.contains_key(name)
    }

    /// Returns the registered property names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.getters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered getters.
    pub fn len(&self) -> usize {
        self.getters.len()
    }

    /// Returns true if no getters are registered.
    pub fn is_empty(&self) -> bool {
        self.getters.is_empty()
    }

    fn lookup<'a>(&self, object: &'a T, name: &str) -> Option<FieldValue<'a>> {
        match self.getters.get(name) {
            Some(getter) => getter(object),
            None => {
                let suggestion = find_similar_name(name, self.getters.keys().map(String::as_str));
                tracing::debug!(
                    property = name,
                    suggestion = suggestion.as_deref(),
                    "no getter registered for property"
                );
                None
            }
        }
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("names", &self.names())
            .finish()
    }
}

impl<T> FieldAccessor<T> for FieldTable<T> {
    fn resolve(&self, object: &T, path: &FieldPath) -> Option<String> {
        resolve_path(path, |name| self.lookup(object, name))
    }
}

impl<T, F> FieldAccessor<T> for F
where
    F: Fn(&T, &FieldPath) -> Option<String>,
{
    fn resolve(&self, object: &T, path: &FieldPath) -> Option<String> {
        self(object, path)
    }
}

/// Finds the closest name within [`MAX_SUGGESTION_DISTANCE`] edits.
///
/// Exact matches (ignoring case) are not suggestions.
pub fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}
