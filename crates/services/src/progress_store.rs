use std::sync::Arc;

use player_core::model::{ModuleId, ProgressPatch, ProgressRecord};
use storage::keys::{self, ACTIVE_MODULE_KEY};
use storage::repository::{KeyValueRepository, StorageError};

use crate::Clock;

/// Load/merge/save of per-module progress on top of a key-value repository.
///
/// Records are stored as one JSON blob per module. Reads never fail: absent,
/// malformed and unreadable records all resolve to the default record.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    kv: Arc<dyn KeyValueRepository>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueRepository>) -> Self {
        Self { clock, kv }
    }

    /// Read the stored record for a module, or the default when there is none.
    pub async fn load(&self, module_id: &ModuleId) -> ProgressRecord {
        match self.kv.get(&keys::progress_key(module_id)).await {
            Ok(Some(raw)) => decode(module_id, &raw),
            Ok(None) => ProgressRecord::default(),
            Err(err) => {
                tracing::warn!(module = %module_id, error = %err, "progress unreadable, starting fresh");
                ProgressRecord::default()
            }
        }
    }

    /// Merge `patch` onto the stored record, stamp `lastUpdated` and write it back.
    ///
    /// Returns the record as written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the existing record cannot be read or the
    /// merged record cannot be written. Nothing is written on a failed read.
    pub async fn save(
        &self,
        module_id: &ModuleId,
        patch: &ProgressPatch,
    ) -> Result<ProgressRecord, StorageError> {
        let key = keys::progress_key(module_id);
        let mut record = match self.kv.get(&key).await? {
            Some(raw) => decode(module_id, &raw),
            None => ProgressRecord::default(),
        };

        record.apply(patch);
        record.last_updated = Some(self.clock.now_millis());

        let raw = serde_json::to_string(&record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.put(&key, &raw).await?;

        tracing::debug!(
            module = %module_id,
            level = record.last_level_index,
            unit = record.last_unit_index,
            quiz_mode = record.quiz_mode_active,
            completed = record.completed_count(),
            "saved progress"
        );
        Ok(record)
    }

    /// Forget everything stored for a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be removed.
    pub async fn reset(&self, module_id: &ModuleId) -> Result<(), StorageError> {
        self.kv.delete(&keys::progress_key(module_id)).await?;
        tracing::info!(module = %module_id, "progress reset");
        Ok(())
    }

    /// Remember `module_id` as the most recently active module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pointer cannot be written.
    pub async fn set_active_module(&self, module_id: &ModuleId) -> Result<(), StorageError> {
        self.kv.put(ACTIVE_MODULE_KEY, module_id.as_str()).await
    }

    /// Most recently active module, if one was recorded and can be read.
    pub async fn active_module(&self) -> Option<ModuleId> {
        match self.kv.get(ACTIVE_MODULE_KEY).await {
            Ok(value) => value
                .map(|raw| raw.trim().to_owned())
                .filter(|raw| !raw.is_empty())
                .map(ModuleId::new),
            Err(err) => {
                tracing::warn!(error = %err, "active module unreadable");
                None
            }
        }
    }

    /// Modules that have a stored progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the keys cannot be listed.
    pub async fn tracked_modules(&self) -> Result<Vec<ModuleId>, StorageError> {
        let stored = self.kv.keys_with_prefix(keys::PROGRESS_PREFIX).await?;
        Ok(stored
            .iter()
            .filter_map(|key| keys::module_id_from_progress_key(key))
            .collect())
    }
}

fn decode(module_id: &ModuleId, raw: &str) -> ProgressRecord {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!(module = %module_id, error = %err, "malformed progress record, using default");
        ProgressRecord::default()
    })
}
