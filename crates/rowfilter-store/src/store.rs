//! Named filter layout storage with XDG path support.
//!
//! Each layout is one JSON file in the layout directory, by default
//! `~/.local/share/rowfilter/layouts/<name>.json`:
//!
//! ```json
//! {
//!   "name": "open-tickets",
//!   "saved_at": "2024-05-01T09:30:00Z",
//!   "filters": {
//!     "Status": { "FilterType": 1, "Filters": ["Open"] }
//!   }
//! }
//! ```
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()`, `delete()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()`, `delete_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rowfilter::extract::find_similar_name;
use rowfilter::{FilterMap, FilterRegistry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreConfig;

/// Extension of layout files.
const LAYOUT_EXTENSION: &str = "json";

/// Extension of in-flight temporary files.
const TEMP_EXTENSION: &str = "tmp";

/// Subdirectory of the data directory that holds layouts.
const LAYOUTS_DIRNAME: &str = "layouts";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "rowfilter";

/// Errors that can occur during layout storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// The layout name cannot be used as a file name.
    #[error("invalid layout name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No layout with this name has been saved.
    #[error("{}", format_not_found(.name, .suggestion.as_deref()))]
    NotFound {
        /// The requested name.
        name: String,
        /// The closest saved layout name, if any is close enough.
        suggestion: Option<String>,
    },

    /// I/O error during file read.
    #[error("failed to read layout file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write layout file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create layout directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file delete.
    #[error("failed to delete layout file '{path}': {source}")]
    DeleteError {
        /// The path that failed to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for layout store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Formats the "not found" error message, optionally including a suggestion.
fn format_not_found(name: &str, suggestion: Option<&str>) -> String {
    let base = format!("layout '{}' not found.", name);
    match suggestion {
        Some(s) => format!("{} Did you mean '{}'?", base, s),
        None => base,
    }
}

/// A saved set of filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// The layout name, which is also its file stem.
    pub name: String,

    /// When the layout was written.
    pub saved_at: DateTime<Utc>,

    /// The filters, in the tagged filter document format.
    pub filters: FilterMap,
}

impl Layout {
    /// Creates a layout stamped with the current time.
    pub fn new(name: impl Into<String>, filters: FilterMap) -> Self {
        Self {
            name: name.into(),
            saved_at: Utc::now(),
            filters,
        }
    }
}

/// Checks that `name` can be used as a layout file stem.
///
/// # Errors
///
/// Returns `StoreError::InvalidName` if the name is empty, contains a path
/// separator or a NUL byte, or starts with a dot.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else if name.starts_with('.') {
        Some("name starts with a dot")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Returns the layout name for a directory entry, if it is a layout file.
fn layout_name(path: &Path) -> Option<String> {
    if path.extension()? != LAYOUT_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    validate_name(stem).ok()?;
    Some(stem.to_string())
}

/// Persistent storage for named filter layouts.
///
/// # Thread Safety
///
/// `LayoutStore` is [`Send`] and [`Sync`]. Each write goes to a temporary
/// file that is then renamed over the layout, so readers never see a
/// partially written file, but two concurrent saves of the same name race
/// and the last rename wins.
///
/// # Example
///
/// ```no_run
/// use rowfilter::{FilterKind, FilterRegistry};
/// use rowfilter_store::LayoutStore;
///
/// let store = LayoutStore::new()?;
///
/// let mut registry = FilterRegistry::new();
/// registry.add_column_filter("Status", "Open", FilterKind::List);
/// store.save("open-tickets", &registry)?;
///
/// let mut restored = FilterRegistry::new();
/// store.load_into("open-tickets", &mut restored)?;
/// # Ok::<(), rowfilter_store::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LayoutStore {
    /// Directory holding the layout files.
    dir: PathBuf,
    /// Whether layout files are pretty-printed.
    pretty: bool,
}

impl LayoutStore {
    /// Creates a new `LayoutStore` in the default XDG data directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let dir = Self::default_dir()?;
        Ok(Self::with_dir(dir))
    }

    /// Creates a new `LayoutStore` with a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: true,
        }
    }

    /// Creates a `LayoutStore` as described by a configuration file.
    ///
    /// Uses the configured layout directory if one is set, otherwise the
    /// default XDG data directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if no directory is configured and the
    /// home directory cannot be determined.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let dir = match config.layouts_dir() {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_dir()?,
        };
        Ok(Self::with_dir(dir).pretty(config.pretty()))
    }

    /// Sets whether layout files are pretty-printed.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Returns the default XDG layout directory.
    ///
    /// On Unix: `~/.local/share/rowfilter/layouts`
    /// On macOS: `~/Library/Application Support/rowfilter/layouts`
    /// On Windows: `C:\Users\<User>\AppData\Roaming\rowfilter\data\layouts`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StoreError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(LAYOUTS_DIRNAME))
    }

    /// Returns the layout directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path of the layout called `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidName` if `name` cannot be used as a file name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, LAYOUT_EXTENSION)))
    }

    fn encode(&self, layout: &Layout) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(layout)?
        } else {
            serde_json::to_string(layout)?
        };
        Ok(json)
    }

    fn decode(path: &Path, contents: &str) -> Result<Layout> {
        serde_json::from_str(contents).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "stored layout failed to decode");
            StoreError::from(e)
        })
    }

    fn not_found(&self, name: &str, existing: &[String]) -> StoreError {
        StoreError::NotFound {
            name: name.to_string(),
            suggestion: find_similar_name(name, existing.iter().map(String::as_str)),
        }
    }

    /// Saves the filters of `registry` as the layout called `name`.
    ///
    /// # Errors
    ///
    /// See [`save_map()`](Self::save_map).
    pub fn save(&self, name: &str, registry: &FilterRegistry) -> Result<()> {
        self.save_map(name, registry.filters())
    }

    /// Saves a filter map as the layout called `name`, replacing any layout
    /// with the same name.
    ///
    /// Creates the layout directory if it doesn't exist. Uses atomic write
    /// (temp file + rename).
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::InvalidName` if `name` cannot be used as a file name.
    /// - Returns `StoreError::CreateDirError` if the directory cannot be created.
    /// - Returns `StoreError::WriteError` if the file cannot be written.
    /// - Returns `StoreError::Json` if serialization fails.
    pub fn save_map(&self, name: &str, filters: &FilterMap) -> Result<()> {
        let path = self.path_for(name)?;

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::CreateDirError {
            path: self.dir.clone(),
            source: e,
        })?;

        let json = self.encode(&Layout::new(name, filters.clone()))?;

        let temp_path = path.with_extension(TEMP_EXTENSION);
        fs::write(&temp_path, &json).map_err(|e| StoreError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &path).map_err(|e| StoreError::WriteError {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(layout = name, filters = filters.len(), "saved filter layout");
        Ok(())
    }

    /// Loads the layout called `name`.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::InvalidName` if `name` cannot be used as a file name.
    /// - Returns `StoreError::NotFound` if no such layout exists.
    /// - Returns `StoreError::ReadError` if the file cannot be read.
    /// - Returns `StoreError::Json` if the file is not a valid layout.
    pub fn load(&self, name: &str) -> Result<Layout> {
        let path = self.path_for(name)?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let existing = self.list().unwrap_or_default();
                return Err(self.not_found(name, &existing));
            }
            Err(e) => return Err(StoreError::ReadError { path, source: e }),
        };

        Self::decode(&path, &contents)
    }

    /// Loads the layout called `name` into `registry`.
    ///
    /// Returns true if the registry changed. If the layout cannot be loaded
    /// the registry is left untouched.
    ///
    /// # Errors
    ///
    /// See [`load()`](Self::load).
    pub fn load_into(&self, name: &str, registry: &mut FilterRegistry) -> Result<bool> {
        let layout = self.load(name)?;
        Ok(registry.load_filters(layout.filters))
    }

    /// Returns true if a layout called `name` exists on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    /// Returns the names of all saved layouts, sorted.
    ///
    /// A missing layout directory has no layouts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadError` if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::ReadError {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadError {
                path: self.dir.clone(),
                source: e,
            })?;
            if let Some(name) = layout_name(&entry.path()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes the layout called `name`.
    ///
    /// # Errors
    ///
    /// - Returns `StoreError::InvalidName` if `name` cannot be used as a file name.
    /// - Returns `StoreError::DeleteError` if the file cannot be deleted.
    ///
    /// Does not return an error if the layout doesn't exist.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(layout = name, "deleted filter layout");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError { path, source: e }),
        }
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Saves a filter map asynchronously using atomic write.
    ///
    /// This is the async equivalent of [`save_map()`](Self::save_map).
    ///
    /// # Errors
    ///
    /// See [`save_map()`](Self::save_map).
    pub async fn save_async(&self, name: &str, filters: &FilterMap) -> Result<()> {
        let path = self.path_for(name)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::CreateDirError {
                path: self.dir.clone(),
                source: e,
            })?;

        let json = self.encode(&Layout::new(name, filters.clone()))?;

        let temp_path = path.with_extension(TEMP_EXTENSION);
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StoreError::WriteError {
                path: path.clone(),
                source: e,
            })?;

        tracing::info!(layout = name, filters = filters.len(), "saved filter layout");
        Ok(())
    }

    /// Loads the layout called `name` asynchronously.
    ///
    /// This is the async equivalent of [`load()`](Self::load).
    ///
    /// # Errors
    ///
    /// See [`load()`](Self::load).
    pub async fn load_async(&self, name: &str) -> Result<Layout> {
        let path = self.path_for(name)?;

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let existing = self.list_async().await.unwrap_or_default();
                return Err(self.not_found(name, &existing));
            }
            Err(e) => return Err(StoreError::ReadError { path, source: e }),
        };

        Self::decode(&path, &contents)
    }

    /// Returns the names of all saved layouts asynchronously, sorted.
    ///
    /// This is the async equivalent of [`list()`](Self::list).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadError` if the directory cannot be read.
    pub async fn list_async(&self) -> Result<Vec<String>> {
        let read_error = |e: io::Error| StoreError::ReadError {
            path: self.dir.clone(),
            source: e,
        };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            if let Some(name) = layout_name(&entry.path()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes the layout called `name` asynchronously.
    ///
    /// This is the async equivalent of [`delete()`](Self::delete).
    ///
    /// # Errors
    ///
    /// See [`delete()`](Self::delete).
    pub async fn delete_async(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(layout = name, "deleted filter layout");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError { path, source: e }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowfilter::{Filter, FilterKind};
    use tempfile::tempdir;

    fn sample() -> FilterMap {
        FilterMap::from([
            ("Status".to_string(), Filter::create(FilterKind::List, "Open")),
            ("Title".to_string(), Filter::create(FilterKind::Text, "\"*jam*\"|paper")),
        ])
    }

    // ==========================================================================
    // Paths and Names
    // ==========================================================================

    #[test]
    fn test_default_dir_returns_xdg_path() {
        let dir = LayoutStore::default_dir().expect("should get default dir");
        let dir_str = dir.to_string_lossy();

        assert!(dir_str.contains("rowfilter"), "dir should contain 'rowfilter': {}", dir_str);
        assert!(dir.ends_with(LAYOUTS_DIRNAME), "dir should end with layouts: {}", dir_str);
        assert!(dir.is_absolute(), "dir should be absolute: {:?}", dir);
    }

    #[test]
    fn test_path_for() {
        let store = LayoutStore::with_dir("/tmp/layouts");
        assert_eq!(
            store.path_for("open").unwrap(),
            PathBuf::from("/tmp/layouts/open.json")
        );
        assert_eq!(
            store.path_for("v1.2").unwrap(),
            PathBuf::from("/tmp/layouts/v1.2.json")
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("open-tickets").is_ok());
        assert!(validate_name("with space").is_ok());

        for name in ["", "   ", "a/b", "a\\b", ".hidden", "..", "a\0b"] {
            let err = validate_name(name).unwrap_err();
            assert!(matches!(err, StoreError::InvalidName { .. }), "{:?}", name);
        }
    }

    #[test]
    fn test_invalid_name_message() {
        let err = validate_name("../etc").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid layout name '../etc': name contains a path separator"
        );
    }

    #[test]
    fn test_layout_name_from_path() {
        assert_eq!(layout_name(Path::new("/x/open.json")), Some("open".to_string()));
        assert_eq!(layout_name(Path::new("/x/open.tmp")), None);
        assert_eq!(layout_name(Path::new("/x/.hidden.json")), None);
        assert_eq!(layout_name(Path::new("/x/readme")), None);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            format_not_found("opne", Some("open")),
            "layout 'opne' not found. Did you mean 'open'?"
        );
        assert_eq!(format_not_found("x", None), "layout 'x' not found.");
    }

    // ==========================================================================
    // Synchronous I/O Tests
    // ==========================================================================

    #[test]
    fn test_save_writes_wire_format() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path());

        store.save_map("open", &sample()).expect("save should succeed");

        let contents = fs::read_to_string(temp_dir.path().join("open.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["name"], "open");
        assert_eq!(value["filters"]["Status"]["FilterType"], 1);
        assert_eq!(value["filters"]["Status"]["Filters"][0], "Open");
        assert_eq!(value["filters"]["Title"]["FilterType"], 2);
        assert!(value["saved_at"].is_string());
    }

    #[test]
    fn test_compact_output() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path()).pretty(false);

        store.save_map("open", &sample()).unwrap();

        let contents = fs::read_to_string(temp_dir.path().join("open.json")).unwrap();
        assert!(!contents.contains('\n'), "compact output: {}", contents);
        assert_eq!(store.load("open").unwrap().filters, sample());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path());

        store.save_map("open", &sample()).unwrap();

        assert!(!temp_dir.path().join("open.tmp").exists());
    }

    #[test]
    fn test_load_missing_suggests_similar_name() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path());
        store.save_map("open", &sample()).unwrap();

        let err = store.load("opne").unwrap_err();
        match err {
            StoreError::NotFound { name, suggestion } => {
                assert_eq!(name, "opne");
                assert_eq!(suggestion.as_deref(), Some("open"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let err = store.load("unrelated").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { suggestion: None, .. }));
    }

    #[test]
    fn test_load_bad_tag_is_json_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path());
        fs::write(
            temp_dir.path().join("bad.json"),
            r#"{"name":"bad","saved_at":"2024-05-01T09:30:00Z","filters":{"a":{"FilterType":0}}}"#,
        )
        .unwrap();

        let err = store.load("bad").unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
        assert!(err.to_string().contains("unknown filter type tag: 0"), "{}", err);
    }

    // ==========================================================================
    // Async I/O Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_async_roundtrip() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path().join("nested"));

        store.save_async("open", &sample()).await.expect("save should succeed");
        let layout = store.load_async("open").await.expect("load should succeed");

        assert_eq!(layout.name, "open");
        assert_eq!(layout.filters, sample());
        assert_eq!(store.list_async().await.unwrap(), vec!["open".to_string()]);

        store.delete_async("open").await.unwrap();
        store.delete_async("open").await.unwrap();
        assert!(!store.exists("open"));
    }

    #[tokio::test]
    async fn test_async_load_missing() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path());
        store.save_async("closed", &sample()).await.unwrap();

        let err = store.load_async("clsoed").await.unwrap_err();
        assert_eq!(err.to_string(), "layout 'clsoed' not found. Did you mean 'closed'?");
    }

    #[tokio::test]
    async fn test_async_list_missing_dir() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = LayoutStore::with_dir(temp_dir.path().join("absent"));
        assert!(store.list_async().await.unwrap().is_empty());
    }
}
