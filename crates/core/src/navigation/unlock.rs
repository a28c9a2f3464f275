use std::collections::BTreeSet;

use crate::model::{LevelId, Module};

/// How a level appears to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Locked,
    Available,
    Completed,
}

/// True once every level of the module has been completed.
///
/// Review mode lifts all navigation locks.
#[must_use]
pub fn is_review_mode(module: &Module, completed: &BTreeSet<LevelId>) -> bool {
    module
        .levels()
        .iter()
        .all(|level| completed.contains(&level.id()))
}

/// Whether the level at `index` may be entered.
///
/// The first level is always open; any other level needs its predecessor
/// completed, unless the module is in review mode.
#[must_use]
pub fn is_level_unlocked(module: &Module, completed: &BTreeSet<LevelId>, index: usize) -> bool {
    if index >= module.level_count() {
        return false;
    }
    if index == 0 || is_review_mode(module, completed) {
        return true;
    }
    module
        .level(index - 1)
        .is_some_and(|previous| completed.contains(&previous.id()))
}

/// Status of the level at `index`, or `None` when out of range.
#[must_use]
pub fn level_status(
    module: &Module,
    completed: &BTreeSet<LevelId>,
    index: usize,
) -> Option<LevelStatus> {
    let level = module.level(index)?;
    let status = if completed.contains(&level.id()) {
        LevelStatus::Completed
    } else if is_level_unlocked(module, completed, index) {
        LevelStatus::Available
    } else {
        LevelStatus::Locked
    };
    Some(status)
}
