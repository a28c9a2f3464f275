//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use player_core::model::ModuleId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading the content catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed JSON or content that fails validation.
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("module {0} is defined more than once")]
    DuplicateModule(ModuleId),
}

/// Errors emitted by `NavigationController`.
///
/// Rejected intents are not errors; only persistence failures surface here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
