use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use player_core::model::{Module, ModuleId};

use crate::error::CatalogError;

/// Read-only lookup of module content.
pub trait ContentRegistry: Send + Sync {
    /// Find a module by id. `None` means the module does not exist.
    fn find_module(&self, id: &ModuleId) -> Option<Arc<Module>>;

    /// All modules in catalog order.
    fn modules(&self) -> Vec<Arc<Module>>;
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    modules: Vec<Module>,
}

/// In-memory registry built once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: Vec<Arc<Module>>,
}

impl Catalog {
    /// Build a catalog from already-validated modules.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateModule` if two modules share an id.
    pub fn from_modules(modules: Vec<Module>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(modules.len());
        for module in &modules {
            if !seen.insert(module.id().clone()) {
                return Err(CatalogError::DuplicateModule(module.id().clone()));
            }
        }
        Ok(Self {
            modules: modules.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a catalog document of the form `{"modules": [...]}`.
    ///
    /// Content is validated while deserializing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON or invalid content and
    /// `CatalogError::DuplicateModule` for repeated module ids.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Self::from_modules(document.modules)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the
    /// errors of [`Catalog::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            modules = catalog.len(),
            "loaded content catalog"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ContentRegistry for Catalog {
    fn find_module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.modules
            .iter()
            .find(|module| module.id() == id)
            .map(Arc::clone)
    }

    fn modules(&self) -> Vec<Arc<Module>> {
        self.modules.clone()
    }
}
