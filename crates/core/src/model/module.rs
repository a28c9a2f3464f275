use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{LevelId, ModuleId, OptionId, QuestionId, UnitId};
use crate::model::question::Quiz;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Catalog content that cannot be played.
///
/// Raised while building or deserializing content; the navigation layer
/// assumes content that passed these checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("module id cannot be empty")]
    EmptyModuleId,

    #[error("module {module} has no levels")]
    EmptyLevels { module: ModuleId },

    #[error("duplicate level id {level}")]
    DuplicateLevelId { level: LevelId },

    #[error("level {level} has no units")]
    EmptyUnits { level: LevelId },

    #[error("duplicate unit id {unit}")]
    DuplicateUnitId { unit: UnitId },

    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("duplicate question id {question}")]
    DuplicateQuestionId { question: QuestionId },

    #[error("question {question} has no options")]
    EmptyOptions { question: QuestionId },

    #[error("question {question} repeats option id {option}")]
    DuplicateOptionId {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {question} marks unknown option {option} as correct")]
    MissingCorrectOption {
        question: QuestionId,
        option: OptionId,
    },
}

//
// ─── UNIT ──────────────────────────────────────────────────────────────────────
//

/// A single piece of reading content. The body is opaque to the player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Unit {
    id: UnitId,
    #[serde(default)]
    title: String,
    content: String,
}

impl Unit {
    #[must_use]
    pub fn new(id: UnitId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct LevelDraft {
    id: LevelId,
    #[serde(default)]
    title: String,
    units: Vec<Unit>,
    quiz: Quiz,
}

/// A gated stage: ordered units followed by one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LevelDraft")]
pub struct Level {
    id: LevelId,
    title: String,
    units: Vec<Unit>,
    quiz: Quiz,
}

impl Level {
    /// Creates a level.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyUnits` if there are no units, or
    /// `ContentError::DuplicateUnitId` if two units share an id.
    pub fn new(
        id: LevelId,
        title: impl Into<String>,
        units: Vec<Unit>,
        quiz: Quiz,
    ) -> Result<Self, ContentError> {
        if units.is_empty() {
            return Err(ContentError::EmptyUnits { level: id });
        }
        let mut seen = HashSet::with_capacity(units.len());
        for unit in &units {
            if !seen.insert(unit.id()) {
                return Err(ContentError::DuplicateUnitId {
                    unit: unit.id().clone(),
                });
            }
        }
        Ok(Self {
            id,
            title: title.into(),
            units,
            quiz,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    /// Index of the final unit. Levels always hold at least one unit.
    #[must_use]
    pub fn last_unit_index(&self) -> usize {
        self.units.len().saturating_sub(1)
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }
}

impl TryFrom<LevelDraft> for Level {
    type Error = ContentError;

    fn try_from(draft: LevelDraft) -> Result<Self, Self::Error> {
        Self::new(draft.id, draft.title, draft.units, draft.quiz)
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct ModuleDraft {
    id: ModuleId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    levels: Vec<Level>,
}

/// Top-level learning unit: an ordered list of levels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ModuleDraft")]
pub struct Module {
    id: ModuleId,
    title: String,
    description: Option<String>,
    levels: Vec<Level>,
}

impl Module {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyModuleId`, `ContentError::EmptyLevels`, or
    /// `ContentError::DuplicateLevelId` when the level list cannot be played.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: Option<String>,
        levels: Vec<Level>,
    ) -> Result<Self, ContentError> {
        if id.as_str().trim().is_empty() {
            return Err(ContentError::EmptyModuleId);
        }
        if levels.is_empty() {
            return Err(ContentError::EmptyLevels { module: id });
        }
        let mut seen = HashSet::with_capacity(levels.len());
        for level in &levels {
            if !seen.insert(level.id()) {
                return Err(ContentError::DuplicateLevelId { level: level.id() });
            }
        }
        Ok(Self {
            id,
            title: title.into(),
            description,
            levels,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn last_level_index(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    #[must_use]
    pub fn contains_level(&self, id: LevelId) -> bool {
        self.levels.iter().any(|level| level.id() == id)
    }
}

impl TryFrom<ModuleDraft> for Module {
    type Error = ContentError;

    fn try_from(draft: ModuleDraft) -> Result<Self, Self::Error> {
        Self::new(draft.id, draft.title, draft.description, draft.levels)
    }
}
