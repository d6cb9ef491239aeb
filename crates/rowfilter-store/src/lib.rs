//! On-disk storage for named rowfilter layouts.
//!
//! A layout is the filter map of a [`rowfilter::FilterRegistry`] saved
//! under a name, so a filter row can be restored later. [`LayoutStore`]
//! reads and writes layouts; [`StoreConfig`] locates them.

pub mod config;
pub mod store;

pub use config::{LayoutsConfig, StoreConfig};
pub use store::{validate_name, Layout, LayoutStore, Result, StoreError};
