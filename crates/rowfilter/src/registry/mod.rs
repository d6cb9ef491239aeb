//! The per-row filter registry.
//!
//! A [`FilterRegistry`] maps field paths to filters and combines them into
//! one predicate: an object is accepted when every registered filter accepts
//! the value at its field. An empty registry accepts everything.
//!
//! # Notifications
//!
//! Observers registered with [`FilterRegistry::subscribe`] are called
//! synchronously after each mutation has completed, with a shared borrow of
//! the registry. They can read it (typically to re-apply the composite
//! predicate to a live collection) but cannot mutate it from inside the
//! callback.
//!
//! # Thread Safety
//!
//! The registry is not thread-safe. Observers are plain `FnMut` closures, so
//! the registry is neither [`Send`] nor [`Sync`]; it is meant to be owned by
//! the single thread that drives the UI.
//!
//! # Example
//!
//! ```
//! use rowfilter::{FilterKind, FilterRegistry, SourceAccessor};
//! use serde_json::json;
//!
//! let mut registry = FilterRegistry::new();
//! registry.add_column_filter("Status", "Open", FilterKind::List);
//! registry.add_column_filter("Name", "\"*smith*\" | jones", FilterKind::Text);
//!
//! let rows = vec![
//!     json!({"Name": "Ann Smith", "Status": "Open"}),
//!     json!({"Name": "Bob Jones", "Status": "Closed"}),
//!     json!({"Name": "Cy Jones", "Status": "Open"}),
//! ];
//!
//! let visible = registry.filter_items(&rows, &SourceAccessor);
//! assert_eq!(visible.len(), 2);
//! ```

mod events;

use std::collections::BTreeMap;
use std::fmt;

use crate::codec;
use crate::error::CodecResult;
use crate::extract::{FieldAccessor, FieldPath};
use crate::filter::{FieldFilter, Filter, FilterKind};

pub use events::{ObserverId, RegistryEvent};

/// Field path to filter. Iteration order is by field name.
pub type FilterMap = BTreeMap<String, Filter>;

type Observer = Box<dyn FnMut(&RegistryEvent, &FilterRegistry)>;

/// Holds the filters of one filter row and combines them.
pub struct FilterRegistry {
    filters: FilterMap,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            filters: FilterMap::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Creates a registry holding `filters`.
    pub fn with_filters(filters: FilterMap) -> Self {
        Self {
            filters,
            ..Self::new()
        }
    }

    // ==================== Observers ====================

    /// Registers a callback run after every mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&RegistryEvent, &FilterRegistry) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a callback. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Returns the number of registered callbacks.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, event: RegistryEvent) {
        tracing::debug!(?event, filters = self.filters.len(), "filter registry changed");

        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(&event, self);
        }
        self.observers = observers;
    }

    // ==================== Mutations ====================

    /// Inserts or replaces the filter for `field`.
    pub fn add_filter(&mut self, field: impl Into<String>, filter: impl Into<Filter>) {
        let field = field.into();
        self.filters.insert(field.clone(), filter.into());
        self.notify(RegistryEvent::FilterChanged { field });
    }

    /// Builds a filter of `kind` from `raw` and sets it for `field`.
    ///
    /// Does nothing and returns false if `raw` is empty.
    pub fn add_column_filter(&mut self, field: impl Into<String>, raw: &str, kind: FilterKind) -> bool {
        if raw.is_empty() {
            return false;
        }

        let field = field.into();
        self.filters.insert(field.clone(), Filter::create(kind, raw));
        self.notify(RegistryEvent::ColumnFilterChanged { field });
        true
    }

    /// Removes the filter for `field`, returning it if there was one.
    pub fn remove_filter(&mut self, field: &str) -> Option<Filter> {
        let removed = self.filters.remove(field);
        self.notify(RegistryEvent::FilterChanged {
            field: field.to_string(),
        });
        removed
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.notify(RegistryEvent::Cleared);
    }

    /// Replaces all filters with `filters` if the content differs.
    ///
    /// Returns true if the registry changed. Identical content is a no-op
    /// and emits nothing.
    pub fn load_filters(&mut self, filters: FilterMap) -> bool {
        if self.filters == filters {
            return false;
        }

        self.filters = filters;
        self.notify(RegistryEvent::Reloaded);
        true
    }

    /// Decodes a filter document and loads it with [`load_filters`](Self::load_filters).
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the document cannot be decoded. The registry
    /// is left untouched and no event is emitted.
    pub fn load_json(&mut self, text: &str) -> CodecResult<bool> {
        let filters = codec::deserialize(text).inspect_err(|e| {
            tracing::debug!(error = %e, "rejected filter document");
        })?;
        Ok(self.load_filters(filters))
    }

    // ==================== Reads ====================

    /// Returns the filter for `field`.
    pub fn get_filter(&self, field: &str) -> Option<&Filter> {
        self.filters.get(field)
    }

    /// Returns the text a filter cell shows for `field`.
    ///
    /// Text filters show their raw string; list filters show all accepted
    /// values joined by `", "`.
    pub fn display_text(&self, field: &str) -> Option<String> {
        self.filters.get(field).map(|filter| match filter {
            Filter::List(list) => list.summary(),
            Filter::Text(text) => text.display(),
        })
    }

    /// Returns the filter map.
    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    /// Returns a copy of the filter map.
    pub fn snapshot(&self) -> FilterMap {
        self.filters.clone()
    }

    /// Iterates over field paths in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Iterates over `(field, filter)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(field, filter)| (field.as_str(), filter))
    }

    /// Returns the number of filtered fields.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if no field is filtered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Encodes the filter map as a pretty-printed JSON document.
    pub fn save_json(&self) -> CodecResult<String> {
        codec::serialize(&self.filters)
    }

    // ==================== Evaluation ====================

    /// Returns true if every registered filter accepts `object`.
    ///
    /// Field paths are resolved through `accessor` on every call.
    pub fn apply_total_filter<T, A>(&self, object: &T, accessor: &A) -> bool
    where
        T: ?Sized,
        A: FieldAccessor<T> + ?Sized,
    {
        self.filters.iter().all(|(field, filter)| {
            let path = FieldPath::parse(field);
            let value = accessor.resolve(object, &path);
            filter.matches(value.as_deref(), &path)
        })
    }

    /// Returns the composite predicate as a closure over this registry.
    pub fn predicate<'a, T, A>(&'a self, accessor: &'a A) -> impl Fn(&T) -> bool + 'a
    where
        T: ?Sized + 'a,
        A: FieldAccessor<T> + ?Sized,
    {
        move |object| self.apply_total_filter(object, accessor)
    }

    /// Returns the items the composite predicate accepts, in order.
    pub fn filter_items<'b, T, A>(&self, items: &'b [T], accessor: &A) -> Vec<&'b T>
    where
        A: FieldAccessor<T> + ?Sized,
    {
        items
            .iter()
            .filter(|item| self.apply_total_filter(*item, accessor))
            .collect()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
