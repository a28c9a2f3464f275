use std::sync::Arc;

use player_core::model::{LevelId, Module, ModuleId, ProgressPatch, ProgressRecord};
use player_core::navigation::{self, Intent, NavState, Rejection, Signal};

use crate::catalog::ContentRegistry;
use crate::error::NavigationError;
use crate::navigation::view::Screen;
use crate::progress_store::ProgressStore;

/// What a dispatched intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The state changed (or was re-entered) with nothing else to report.
    Moved,
    /// The intent was not valid here. State and storage are unchanged.
    Rejected(Rejection),
    LevelPassed { level_id: LevelId, first_time: bool },
    ModuleCompleted,
    /// The learner is done with the module; the host should show its hub.
    NavigateToHub,
}

impl From<Option<Signal>> for DispatchOutcome {
    fn from(signal: Option<Signal>) -> Self {
        match signal {
            None => DispatchOutcome::Moved,
            Some(Signal::LevelPassed {
                level_id,
                first_time,
            }) => DispatchOutcome::LevelPassed {
                level_id,
                first_time,
            },
            Some(Signal::ModuleCompleted) => DispatchOutcome::ModuleCompleted,
            Some(Signal::NavigateToHub) => DispatchOutcome::NavigateToHub,
        }
    }
}

/// Drives one learner through one module.
///
/// Owns the in-memory navigation state and a copy of the stored progress.
/// Every transition that carries a patch is written through the store
/// before the new state is adopted.
pub struct NavigationController {
    module: Arc<Module>,
    store: ProgressStore,
    progress: ProgressRecord,
    state: NavState,
    learner_name: Option<String>,
}

impl NavigationController {
    /// Open `module_id` at its overview.
    ///
    /// Returns `None` when the registry has no such module. Stored progress
    /// that no longer matches the module content is reconciled and written
    /// back; if that write fails the reconciled record is still used.
    pub async fn enter(
        registry: &dyn ContentRegistry,
        store: ProgressStore,
        module_id: &ModuleId,
        learner_name: Option<String>,
    ) -> Option<Self> {
        let Some(module) = registry.find_module(module_id) else {
            tracing::warn!(module = %module_id, "module not found");
            return None;
        };

        let mut progress = store.load(module_id).await;
        if progress.reconcile(&module) {
            tracing::info!(module = %module_id, "stored progress adjusted to current content");
            match store
                .save(module_id, &ProgressPatch::replacing(&progress))
                .await
            {
                Ok(saved) => progress = saved,
                Err(err) => {
                    tracing::warn!(module = %module_id, error = %err, "could not store adjusted progress");
                }
            }
        }

        if let Err(err) = store.set_active_module(module_id).await {
            tracing::warn!(module = %module_id, error = %err, "could not record active module");
        }

        tracing::info!(
            module = %module_id,
            completed = progress.completed_count(),
            level = progress.last_level_index,
            unit = progress.last_unit_index,
            "entered module"
        );

        Some(Self {
            module,
            store,
            progress,
            state: NavState::Overview,
            learner_name: learner_name.filter(|name| !name.trim().is_empty()),
        })
    }

    /// Apply a learner intent.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Storage` if the transition's progress could
    /// not be persisted. The controller keeps its previous state in that case.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<DispatchOutcome, NavigationError> {
        let transition =
            match navigation::step(&self.module, &self.state, intent.clone(), &self.progress) {
                Ok(transition) => transition,
                Err(rejection) => {
                    tracing::debug!(?intent, %rejection, "intent rejected");
                    return Ok(DispatchOutcome::Rejected(rejection));
                }
            };

        if let Some(patch) = transition.patch.as_ref().filter(|patch| !patch.is_empty()) {
            self.progress = self.persist(patch).await?;
        }
        self.state = transition.state;

        let outcome = DispatchOutcome::from(transition.signal);
        match &outcome {
            DispatchOutcome::LevelPassed {
                level_id,
                first_time,
            } => {
                tracing::info!(module = %self.module.id(), level = %level_id, first_time, "level passed");
            }
            DispatchOutcome::ModuleCompleted => {
                tracing::info!(module = %self.module.id(), "module completed");
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Apply `patch` to the controller's record and write the whole record.
    ///
    /// The stored blob is never merged on its own: it may predate a content
    /// change if the write in `enter` failed, and the in-memory record is the
    /// reconciled one.
    async fn persist(&self, patch: &ProgressPatch) -> Result<ProgressRecord, NavigationError> {
        let mut next = self.progress.clone();
        next.apply(patch);
        let record = self
            .store
            .save(self.module.id(), &ProgressPatch::replacing(&next))
            .await?;
        Ok(record)
    }

    /// Wipe stored progress for this module and return to the overview.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Storage` if the record cannot be removed.
    pub async fn reset_progress(&mut self) -> Result<(), NavigationError> {
        self.store.reset(self.module.id()).await?;
        self.progress = ProgressRecord::default();
        self.state = NavState::Overview;
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &NavState {
        &self.state
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Render-ready projection of the current state.
    #[must_use]
    pub fn screen(&self) -> Screen {
        Screen::project(
            &self.module,
            &self.state,
            &self.progress,
            self.learner_name.as_deref(),
        )
    }
}
