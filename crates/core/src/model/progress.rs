use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::LevelId;
use crate::model::module::Module;

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Persisted resume and completion state for one module.
///
/// Serialized field names are part of the stored layout and must not change.
/// Missing fields fall back to their defaults so older blobs still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    /// Levels whose quiz has been passed at least once. Only ever grows.
    pub completed_level_ids: BTreeSet<LevelId>,
    pub last_level_index: usize,
    pub last_unit_index: usize,
    pub quiz_mode_active: bool,
    /// Milliseconds since epoch of the last write. Diagnostic only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl ProgressRecord {
    #[must_use]
    pub fn is_completed(&self, id: LevelId) -> bool {
        self.completed_level_ids.contains(&id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_level_ids.len()
    }

    /// Stored `(level, unit)` position.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.last_level_index, self.last_unit_index)
    }

    /// True if nothing has ever been recorded for the module.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.last_updated.is_none() && self.completed_level_ids.is_empty()
    }

    /// Overwrites the fields present in `patch`; all others are left untouched.
    pub fn apply(&mut self, patch: &ProgressPatch) {
        if let Some(ids) = &patch.completed_level_ids {
            self.completed_level_ids.clone_from(ids);
        }
        if let Some(level) = patch.last_level_index {
            self.last_level_index = level;
        }
        if let Some(unit) = patch.last_unit_index {
            self.last_unit_index = unit;
        }
        if let Some(active) = patch.quiz_mode_active {
            self.quiz_mode_active = active;
        }
    }

    /// Brings a stored record in line with the module it belongs to.
    ///
    /// Unknown level ids are dropped and out-of-range indices are clamped.
    /// Returns `true` if anything had to change.
    pub fn reconcile(&mut self, module: &Module) -> bool {
        let before = self.clone();

        self.completed_level_ids
            .retain(|id| module.contains_level(*id));

        self.last_level_index = self.last_level_index.min(module.last_level_index());
        let last_unit = module
            .level(self.last_level_index)
            .map_or(0, |level| level.last_unit_index());
        self.last_unit_index = self.last_unit_index.min(last_unit);

        *self != before
    }
}

//
// ─── PROGRESS PATCH ────────────────────────────────────────────────────────────
//

/// A partial update to a `ProgressRecord`.
///
/// `lastUpdated` is deliberately absent: the store stamps it on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub completed_level_ids: Option<BTreeSet<LevelId>>,
    pub last_level_index: Option<usize>,
    pub last_unit_index: Option<usize>,
    pub quiz_mode_active: Option<bool>,
}

impl ProgressPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that overwrites every stored field with `record`'s values.
    #[must_use]
    pub fn replacing(record: &ProgressRecord) -> Self {
        Self {
            completed_level_ids: Some(record.completed_level_ids.clone()),
            last_level_index: Some(record.last_level_index),
            last_unit_index: Some(record.last_unit_index),
            quiz_mode_active: Some(record.quiz_mode_active),
        }
    }

    #[must_use]
    pub fn level(mut self, index: usize) -> Self {
        self.last_level_index = Some(index);
        self
    }

    #[must_use]
    pub fn unit(mut self, index: usize) -> Self {
        self.last_unit_index = Some(index);
        self
    }

    #[must_use]
    pub fn quiz_mode(mut self, active: bool) -> Self {
        self.quiz_mode_active = Some(active);
        self
    }

    #[must_use]
    pub fn completed(mut self, ids: BTreeSet<LevelId>) -> Self {
        self.completed_level_ids = Some(ids);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed_level_ids.is_none()
            && self.last_level_index.is_none()
            && self.last_unit_index.is_none()
            && self.quiz_mode_active.is_none()
    }
}
