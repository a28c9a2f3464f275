use thiserror::Error;

use crate::model::{LevelId, OptionId, ProgressPatch, QuestionId};
use crate::quiz::{QuizScore, Selections};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the learner currently is inside a module.
///
/// Levels and units are addressed by index into the module's ordered lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    /// Landing/resume screen. Always the first state on entering a module.
    #[default]
    Overview,
    Reading {
        level: usize,
        unit: usize,
    },
    QuizInProgress {
        level: usize,
        selections: Selections,
    },
    /// A submitted attempt. Selections are frozen until retry.
    QuizResult {
        level: usize,
        selections: Selections,
        score: QuizScore,
    },
    ModuleComplete,
}

//
// ─── INTENTS ───────────────────────────────────────────────────────────────────
//

/// A learner action sent by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Leave the overview at the stored position.
    Start,
    /// Leave the overview straight into the quiz the learner left unfinished.
    ResumeQuiz,
    NextUnit,
    PreviousUnit,
    SelectOption {
        question: QuestionId,
        option: OptionId,
    },
    Submit,
    Continue,
    Retry,
    /// Direct jump to a level by index.
    JumpToLevel(usize),
    OpenOverview,
    AcknowledgeCompletion,
}

//
// ─── REJECTIONS ────────────────────────────────────────────────────────────────
//

/// Why an intent did not fire. The state is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rejection {
    #[error("intent is not available in the current state")]
    NotAvailable,

    #[error("already on the first unit")]
    NoPreviousUnit,

    #[error("answered {answered} of {total} questions")]
    Incomplete { answered: usize, total: usize },

    #[error("quiz has no question {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {question} has no option {option}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("quiz attempt was not passed")]
    NotPassed,

    #[error("quiz attempt was already passed")]
    AlreadyPassed,

    #[error("no level at index {0}")]
    LevelOutOfRange(usize),

    #[error("level at index {0} is locked")]
    LevelLocked(usize),

    #[error("no quiz was in progress")]
    QuizNotActive,
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Notable events produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A quiz was passed. `first_time` is false when the level was already complete.
    LevelPassed { level_id: LevelId, first_time: bool },
    /// The last level's quiz was passed and the learner continued.
    ModuleCompleted,
    /// The learner acknowledged completion; the host should return to its hub.
    NavigateToHub,
}

/// Outcome of a fired intent: the next state and what to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: NavState,
    pub patch: Option<ProgressPatch>,
    pub signal: Option<Signal>,
}

impl Transition {
    #[must_use]
    pub fn to(state: NavState) -> Self {
        Self {
            state,
            patch: None,
            signal: None,
        }
    }

    #[must_use]
    pub fn persisting(mut self, patch: ProgressPatch) -> Self {
        self.patch = Some(patch);
        self
    }

    #[must_use]
    pub fn signalling(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }
}
