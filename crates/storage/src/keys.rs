//! Key layout of the progress key-value store.

use player_core::model::ModuleId;

/// Global key holding the id of the most recently active module.
pub const ACTIVE_MODULE_KEY: &str = "active-module";

/// Prefix shared by all progress keys.
pub const PROGRESS_PREFIX: &str = "module-progress:";

/// Key of the progress blob for one module.
#[must_use]
pub fn progress_key(module_id: &ModuleId) -> String {
    format!("{PROGRESS_PREFIX}{module_id}")
}

/// Inverse of [`progress_key`].
#[must_use]
pub fn module_id_from_progress_key(key: &str) -> Option<ModuleId> {
    key.strip_prefix(PROGRESS_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(ModuleId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_key_round_trips_module_id() {
        let id = ModuleId::new("ownership-101");
        let key = progress_key(&id);
        assert_eq!(key, "module-progress:ownership-101");
        assert_eq!(module_id_from_progress_key(&key), Some(id));
        assert_eq!(module_id_from_progress_key(ACTIVE_MODULE_KEY), None);
        assert_eq!(module_id_from_progress_key("module-progress:"), None);
    }
}
