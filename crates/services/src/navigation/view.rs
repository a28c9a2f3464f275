use player_core::model::{LevelId, Module, ModuleId, OptionId, ProgressRecord, QuestionId, UnitId};
use player_core::navigation::{LevelStatus, NavState, is_review_mode, level_status};
use player_core::quiz::{self, QuizScore, Selections};

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// One row of the level list on the overview screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRow {
    pub index: usize,
    pub id: LevelId,
    pub title: String,
    pub unit_count: usize,
    pub question_count: usize,
    pub status: LevelStatus,
    /// The level the learner would resume in.
    pub is_current: bool,
}

/// Where "start/resume" will take the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub level_index: usize,
    pub unit_index: usize,
    pub level_title: String,
    pub quiz_mode_active: bool,
    /// No progress has ever been stored for this module.
    pub is_fresh: bool,
}

/// Landing screen of a module. Reads progress, never writes it.
///
/// Presentation-agnostic: no pre-formatted strings beyond content titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewView {
    pub module_id: ModuleId,
    pub title: String,
    pub description: Option<String>,
    pub learner_name: Option<String>,
    pub levels: Vec<LevelRow>,
    pub completed_count: usize,
    pub total_levels: usize,
    pub percent_complete: u8,
    pub review_mode: bool,
    pub resume: ResumePoint,
}

impl OverviewView {
    #[must_use]
    pub fn build(module: &Module, progress: &ProgressRecord, learner_name: Option<&str>) -> Self {
        let completed = &progress.completed_level_ids;
        let (resume_level, resume_unit) = progress.position();

        let levels = module
            .levels()
            .iter()
            .enumerate()
            .map(|(index, level)| LevelRow {
                index,
                id: level.id(),
                title: level.title().to_owned(),
                unit_count: level.units().len(),
                question_count: level.quiz().len(),
                status: level_status(module, completed, index).unwrap_or(LevelStatus::Locked),
                is_current: index == resume_level,
            })
            .collect();

        let completed_count = module
            .levels()
            .iter()
            .filter(|level| completed.contains(&level.id()))
            .count();

        Self {
            module_id: module.id().clone(),
            title: module.title().to_owned(),
            description: module.description().map(str::to_owned),
            learner_name: learner_name.map(str::to_owned),
            levels,
            completed_count,
            total_levels: module.level_count(),
            percent_complete: quiz::percentage(completed_count, module.level_count()),
            review_mode: is_review_mode(module, completed),
            resume: ResumePoint {
                level_index: resume_level,
                unit_index: resume_unit,
                level_title: module
                    .level(resume_level)
                    .map(|level| level.title().to_owned())
                    .unwrap_or_default(),
                quiz_mode_active: progress.quiz_mode_active,
                is_fresh: progress.is_fresh(),
            },
        }
    }
}

//
// ─── READING ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingView {
    pub level_index: usize,
    pub level_title: String,
    pub unit_index: usize,
    pub unit_count: usize,
    pub unit_id: UnitId,
    pub unit_title: String,
    pub content: String,
    pub has_previous: bool,
    /// "Next" from here opens the quiz.
    pub is_last_unit: bool,
}

impl ReadingView {
    #[must_use]
    pub fn build(module: &Module, level_index: usize, unit_index: usize) -> Option<Self> {
        let level = module.level(level_index)?;
        let unit = level.unit(unit_index)?;
        Some(Self {
            level_index,
            level_title: level.title().to_owned(),
            unit_index,
            unit_count: level.units().len(),
            unit_id: unit.id().clone(),
            unit_title: unit.title().to_owned(),
            content: unit.content().to_owned(),
            has_previous: unit_index > 0,
            is_last_unit: unit_index == level.last_unit_index(),
        })
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub id: OptionId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionView>,
    pub selected: Option<OptionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub level_index: usize,
    pub level_title: String,
    pub questions: Vec<QuestionView>,
    pub answered: usize,
    pub total: usize,
    pub can_submit: bool,
}

impl QuizView {
    #[must_use]
    pub fn build(module: &Module, level_index: usize, selections: &Selections) -> Option<Self> {
        let level = module.level(level_index)?;
        let quiz = level.quiz();
        let questions = quiz
            .questions()
            .iter()
            .map(|question| QuestionView {
                id: question.id().clone(),
                prompt: question.prompt().to_owned(),
                options: question
                    .options()
                    .iter()
                    .map(|option| OptionView {
                        id: option.id().clone(),
                        text: option.text().to_owned(),
                    })
                    .collect(),
                selected: selections.get(question.id()).cloned(),
            })
            .collect();

        Some(Self {
            level_index,
            level_title: level.title().to_owned(),
            questions,
            answered: quiz::answered_count(quiz, selections),
            total: quiz.len(),
            can_submit: quiz::is_fully_answered(quiz, selections),
        })
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub level_index: usize,
    pub level_title: String,
    pub score: QuizScore,
    pub can_continue: bool,
    pub can_retry: bool,
    /// Continue leads to module completion rather than the next level.
    pub completes_module: bool,
}

impl ResultView {
    #[must_use]
    pub fn build(module: &Module, level_index: usize, score: &QuizScore) -> Option<Self> {
        let level = module.level(level_index)?;
        Some(Self {
            level_index,
            level_title: level.title().to_owned(),
            score: score.clone(),
            can_continue: score.passed,
            can_retry: !score.passed,
            completes_module: score.passed && level_index >= module.last_level_index(),
        })
    }
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionView {
    pub module_id: ModuleId,
    pub title: String,
    pub learner_name: Option<String>,
    pub total_levels: usize,
}

//
// ─── SCREEN ────────────────────────────────────────────────────────────────────
//

/// Projection of the controller state that a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Overview(OverviewView),
    Reading(ReadingView),
    Quiz(QuizView),
    Result(ResultView),
    Complete(CompletionView),
}

impl Screen {
    /// Project `state` for rendering.
    ///
    /// Falls back to the overview if the state points outside the module,
    /// which cannot happen for states produced by the state machine.
    #[must_use]
    pub fn project(
        module: &Module,
        state: &NavState,
        progress: &ProgressRecord,
        learner_name: Option<&str>,
    ) -> Self {
        let projected = match state {
            NavState::Overview => None,
            NavState::Reading { level, unit } => {
                ReadingView::build(module, *level, *unit).map(Screen::Reading)
            }
            NavState::QuizInProgress { level, selections } => {
                QuizView::build(module, *level, selections).map(Screen::Quiz)
            }
            NavState::QuizResult { level, score, .. } => {
                ResultView::build(module, *level, score).map(Screen::Result)
            }
            NavState::ModuleComplete => Some(Screen::Complete(CompletionView {
                module_id: module.id().clone(),
                title: module.title().to_owned(),
                learner_name: learner_name.map(str::to_owned),
                total_levels: module.level_count(),
            })),
        };

        projected.unwrap_or_else(|| {
            Screen::Overview(OverviewView::build(module, progress, learner_name))
        })
    }
}
