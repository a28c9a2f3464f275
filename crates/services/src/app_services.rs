use std::sync::Arc;

use player_core::model::ModuleId;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{Catalog, ContentRegistry};
use crate::error::AppServicesError;
use crate::navigation::NavigationController;
use crate::progress_store::ProgressStore;

/// Catalog entry with the learner's standing in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub is_active: bool,
}

impl ModuleSummary {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Assembles the content catalog and progress storage for the app.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    progress: ProgressStore,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, catalog))
    }

    /// Build services that keep progress in memory only.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: Catalog) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            progress: ProgressStore::new(clock, Arc::clone(&storage.kv)),
        }
    }

    #[must_use]
    pub fn progress(&self) -> ProgressStore {
        self.progress.clone()
    }

    /// Open a module for a learner. `None` if the module is not in the catalog.
    pub async fn enter_module(
        &self,
        module_id: &ModuleId,
        learner_name: Option<String>,
    ) -> Option<NavigationController> {
        NavigationController::enter(
            self.catalog.as_ref(),
            self.progress.clone(),
            module_id,
            learner_name,
        )
        .await
    }

    /// Pick the module to open on launch.
    ///
    /// Tries `preferred`, then the last active module, then the first module
    /// in the catalog. Ids that are not in the catalog are skipped.
    pub async fn resolve_module(&self, preferred: Option<&ModuleId>) -> Option<ModuleId> {
        if let Some(id) = preferred {
            if self.catalog.find_module(id).is_some() {
                return Some(id.clone());
            }
            tracing::warn!(module = %id, "requested module not in catalog");
        }

        if let Some(active) = self.progress.active_module().await {
            if self.catalog.find_module(&active).is_some() {
                return Some(active);
            }
        }

        self.catalog
            .modules()
            .first()
            .map(|module| module.id().clone())
    }

    /// Modules with stored progress that the catalog no longer contains.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if stored keys cannot be listed.
    pub async fn orphaned_progress(&self) -> Result<Vec<ModuleId>, AppServicesError> {
        let tracked = self.progress.tracked_modules().await?;
        Ok(tracked
            .into_iter()
            .filter(|id| self.catalog.find_module(id).is_none())
            .collect())
    }

    /// Every catalog module with its completion counts.
    pub async fn module_summaries(&self) -> Vec<ModuleSummary> {
        let active = self.progress.active_module().await;
        let mut summaries = Vec::with_capacity(self.catalog.len());
        for module in self.catalog.modules() {
            let mut record = self.progress.load(module.id()).await;
            record.reconcile(&module);
            summaries.push(ModuleSummary {
                id: module.id().clone(),
                title: module.title().to_owned(),
                completed: record.completed_count(),
                total: module.level_count(),
                is_active: active.as_ref() == Some(module.id()),
            });
        }
        summaries
    }
}
