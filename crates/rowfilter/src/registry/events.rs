//! Change notifications emitted by the filter registry.

/// What changed in a [`FilterRegistry`](super::FilterRegistry).
///
/// Every mutating call emits exactly one event. In every case the composite
/// predicate must be re-applied to the items view; [`refreshes_cells`]
/// additionally tells filter cells to reload what they display.
///
/// [`refreshes_cells`]: RegistryEvent::refreshes_cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A filter was inserted, replaced or removed programmatically.
    FilterChanged {
        /// The affected field.
        field: String,
    },

    /// A column filter was set from a raw value.
    ColumnFilterChanged {
        /// The affected field.
        field: String,
    },

    /// All filters were removed.
    Cleared,

    /// The whole filter map was replaced by different content.
    Reloaded,
}

impl RegistryEvent {
    /// Returns true if filter cells should reload their displayed filter.
    pub fn refreshes_cells(&self) -> bool {
        !matches!(self, RegistryEvent::FilterChanged { .. })
    }

    /// Returns the affected field, for single-field events.
    pub fn field(&self) -> Option<&str> {
        match self {
            RegistryEvent::FilterChanged { field } | RegistryEvent::ColumnFilterChanged { field } => {
                Some(field)
            }
            RegistryEvent::Cleared | RegistryEvent::Reloaded => None,
        }
    }
}

/// Handle returned by [`FilterRegistry::subscribe`](super::FilterRegistry::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);
