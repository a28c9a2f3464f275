use crate::model::{Level, Module, OptionId, ProgressPatch, ProgressRecord, QuestionId};
use crate::navigation::state::{Intent, NavState, Rejection, Signal, Transition};
use crate::navigation::unlock::is_level_unlocked;
use crate::quiz::{self, Selections};

/// Applies `intent` to `state`.
///
/// Returns the transition to take, or the reason the intent cannot fire.
/// Nothing is mutated here; the caller persists `Transition::patch` and then
/// adopts `Transition::state`.
///
/// # Errors
///
/// Returns a `Rejection` when the intent's precondition does not hold in the
/// current state. Rejections are expected outcomes, not failures.
pub fn step(
    module: &Module,
    state: &NavState,
    intent: Intent,
    progress: &ProgressRecord,
) -> Result<Transition, Rejection> {
    match intent {
        Intent::Start => start(module, state, progress),
        Intent::ResumeQuiz => resume_quiz(module, state, progress),
        Intent::NextUnit => next_unit(module, state),
        Intent::PreviousUnit => previous_unit(module, state),
        Intent::SelectOption { question, option } => select_option(module, state, question, option),
        Intent::Submit => submit(module, state, progress),
        Intent::Continue => continue_from_result(module, state),
        Intent::Retry => retry(state),
        Intent::JumpToLevel(index) => jump_to_level(module, index, progress),
        Intent::OpenOverview => Ok(Transition::to(NavState::Overview)),
        Intent::AcknowledgeCompletion => acknowledge(state),
    }
}

fn level_at(module: &Module, index: usize) -> Result<&Level, Rejection> {
    module
        .level(index)
        .ok_or(Rejection::LevelOutOfRange(index))
}

/// Stored position clamped into the module, in case the record predates a content change.
fn resume_position(module: &Module, progress: &ProgressRecord) -> (usize, usize) {
    let level = progress.last_level_index.min(module.last_level_index());
    let unit = module
        .level(level)
        .map_or(0, |l| progress.last_unit_index.min(l.last_unit_index()));
    (level, unit)
}

fn start(
    module: &Module,
    state: &NavState,
    progress: &ProgressRecord,
) -> Result<Transition, Rejection> {
    if *state != NavState::Overview {
        return Err(Rejection::NotAvailable);
    }
    let (level, unit) = resume_position(module, progress);
    Ok(Transition::to(NavState::Reading { level, unit }))
}

fn resume_quiz(
    module: &Module,
    state: &NavState,
    progress: &ProgressRecord,
) -> Result<Transition, Rejection> {
    if *state != NavState::Overview {
        return Err(Rejection::NotAvailable);
    }
    if !progress.quiz_mode_active {
        return Err(Rejection::QuizNotActive);
    }
    let (level, _) = resume_position(module, progress);
    Ok(Transition::to(NavState::QuizInProgress {
        level,
        selections: Selections::new(),
    }))
}

fn next_unit(module: &Module, state: &NavState) -> Result<Transition, Rejection> {
    let NavState::Reading { level, unit } = *state else {
        return Err(Rejection::NotAvailable);
    };
    let current = level_at(module, level)?;

    if unit < current.last_unit_index() {
        let next = unit + 1;
        return Ok(
            Transition::to(NavState::Reading { level, unit: next })
                .persisting(ProgressPatch::new().level(level).unit(next).quiz_mode(false)),
        );
    }

    Ok(Transition::to(NavState::QuizInProgress {
        level,
        selections: Selections::new(),
    })
    .persisting(ProgressPatch::new().quiz_mode(true)))
}

fn previous_unit(module: &Module, state: &NavState) -> Result<Transition, Rejection> {
    match *state {
        NavState::Reading { level, unit } => {
            if unit == 0 {
                return Err(Rejection::NoPreviousUnit);
            }
            let previous = unit - 1;
            Ok(Transition::to(NavState::Reading {
                level,
                unit: previous,
            })
            .persisting(ProgressPatch::new().unit(previous).quiz_mode(false)))
        }
        NavState::QuizInProgress { level, .. } => {
            let last = level_at(module, level)?.last_unit_index();
            Ok(Transition::to(NavState::Reading { level, unit: last })
                .persisting(ProgressPatch::new().level(level).unit(last).quiz_mode(false)))
        }
        _ => Err(Rejection::NotAvailable),
    }
}

fn select_option(
    module: &Module,
    state: &NavState,
    question: QuestionId,
    option: OptionId,
) -> Result<Transition, Rejection> {
    let NavState::QuizInProgress { level, selections } = state else {
        return Err(Rejection::NotAvailable);
    };
    let quiz = level_at(module, *level)?.quiz();
    let Some(target) = quiz.question(&question) else {
        return Err(Rejection::UnknownQuestion(question));
    };
    if target.option(&option).is_none() {
        return Err(Rejection::UnknownOption { question, option });
    }

    let mut selections = selections.clone();
    selections.insert(question, option);
    Ok(Transition::to(NavState::QuizInProgress {
        level: *level,
        selections,
    }))
}

fn submit(
    module: &Module,
    state: &NavState,
    progress: &ProgressRecord,
) -> Result<Transition, Rejection> {
    let NavState::QuizInProgress { level, selections } = state else {
        return Err(Rejection::NotAvailable);
    };
    let current = level_at(module, *level)?;
    let quiz = current.quiz();

    if !quiz::is_fully_answered(quiz, selections) {
        return Err(Rejection::Incomplete {
            answered: quiz::answered_count(quiz, selections),
            total: quiz.len(),
        });
    }

    let score = quiz::score(quiz, selections);
    let passed = score.passed;
    let transition = Transition::to(NavState::QuizResult {
        level: *level,
        selections: selections.clone(),
        score,
    });

    if !passed {
        return Ok(transition);
    }

    let mut completed = progress.completed_level_ids.clone();
    let first_time = completed.insert(current.id());
    Ok(transition
        .persisting(ProgressPatch::new().completed(completed))
        .signalling(Signal::LevelPassed {
            level_id: current.id(),
            first_time,
        }))
}

fn continue_from_result(module: &Module, state: &NavState) -> Result<Transition, Rejection> {
    let NavState::QuizResult { level, score, .. } = state else {
        return Err(Rejection::NotAvailable);
    };
    if !score.passed {
        return Err(Rejection::NotPassed);
    }
    if *level >= module.last_level_index() {
        return Ok(Transition::to(NavState::ModuleComplete).signalling(Signal::ModuleCompleted));
    }

    let next = level + 1;
    Ok(Transition::to(NavState::Reading {
        level: next,
        unit: 0,
    })
    .persisting(ProgressPatch::new().level(next).unit(0).quiz_mode(false)))
}

fn retry(state: &NavState) -> Result<Transition, Rejection> {
    let NavState::QuizResult { level, score, .. } = state else {
        return Err(Rejection::NotAvailable);
    };
    if score.passed {
        return Err(Rejection::AlreadyPassed);
    }
    Ok(Transition::to(NavState::QuizInProgress {
        level: *level,
        selections: Selections::new(),
    }))
}

fn jump_to_level(
    module: &Module,
    index: usize,
    progress: &ProgressRecord,
) -> Result<Transition, Rejection> {
    level_at(module, index)?;
    if !is_level_unlocked(module, &progress.completed_level_ids, index) {
        return Err(Rejection::LevelLocked(index));
    }
    Ok(Transition::to(NavState::Reading {
        level: index,
        unit: 0,
    })
    .persisting(ProgressPatch::new().level(index).unit(0).quiz_mode(false)))
}

fn acknowledge(state: &NavState) -> Result<Transition, Rejection> {
    if *state != NavState::ModuleComplete {
        return Err(Rejection::NotAvailable);
    }
    Ok(Transition::to(NavState::Overview).signalling(Signal::NavigateToHub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelId;
    use crate::navigation::tests_support::module;
    use std::collections::BTreeSet;

    /// Drives `step` the way the controller does: apply patches, adopt states.
    struct Harness {
        module: Module,
        state: NavState,
        progress: ProgressRecord,
        signals: Vec<Signal>,
    }

    impl Harness {
        fn new(module: Module) -> Self {
            Self::with_progress(module, ProgressRecord::default())
        }

        fn with_progress(module: Module, progress: ProgressRecord) -> Self {
            Self {
                module,
                state: NavState::Overview,
                progress,
                signals: Vec::new(),
            }
        }

        fn send(&mut self, intent: Intent) -> Result<(), Rejection> {
            let transition = step(&self.module, &self.state, intent, &self.progress)?;
            if let Some(patch) = &transition.patch {
                self.progress.apply(patch);
            }
            if let Some(signal) = transition.signal {
                self.signals.push(signal);
            }
            self.state = transition.state;
            Ok(())
        }

        fn select(&mut self, question: &str, option: &str) {
            self.send(Intent::SelectOption {
                question: QuestionId::new(question),
                option: OptionId::new(option),
            })
            .unwrap();
        }

        fn score(&self) -> &crate::quiz::QuizScore {
            match &self.state {
                NavState::QuizResult { score, .. } => score,
                other => panic!("expected result, got {other:?}"),
            }
        }
    }

    fn completed(raw: &[u32]) -> BTreeSet<LevelId> {
        raw.iter().copied().map(LevelId::new).collect()
    }

    #[test]
    fn start_defaults_to_first_unit() {
        let mut h = Harness::new(module(&[2, 2], 2));
        h.send(Intent::Start).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 0, unit: 0 });
    }

    #[test]
    fn start_resumes_stored_position() {
        let progress = ProgressRecord {
            last_level_index: 2,
            last_unit_index: 1,
            completed_level_ids: completed(&[10, 20]),
            ..ProgressRecord::default()
        };
        let mut h = Harness::with_progress(module(&[2, 2, 3], 2), progress);
        h.send(Intent::Start).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 2, unit: 1 });
    }

    #[test]
    fn start_is_only_available_from_overview() {
        let mut h = Harness::new(module(&[2], 1));
        h.send(Intent::Start).unwrap();
        assert_eq!(h.send(Intent::Start), Err(Rejection::NotAvailable));
    }

    #[test]
    fn next_unit_advances_and_persists_position() {
        let m = module(&[3], 1);
        let t = step(
            &m,
            &NavState::Reading { level: 0, unit: 0 },
            Intent::NextUnit,
            &ProgressRecord::default(),
        )
        .unwrap();
        assert_eq!(t.state, NavState::Reading { level: 0, unit: 1 });
        assert_eq!(
            t.patch,
            Some(ProgressPatch::new().level(0).unit(1).quiz_mode(false))
        );
    }

    #[test]
    fn next_on_last_unit_enters_quiz_mode() {
        let m = module(&[2], 1);
        let t = step(
            &m,
            &NavState::Reading { level: 0, unit: 1 },
            Intent::NextUnit,
            &ProgressRecord::default(),
        )
        .unwrap();
        assert_eq!(
            t.state,
            NavState::QuizInProgress {
                level: 0,
                selections: Selections::new()
            }
        );
        assert_eq!(t.patch, Some(ProgressPatch::new().quiz_mode(true)));
    }

    #[test]
    fn previous_unit_is_rejected_on_first_unit() {
        let m = module(&[2], 1);
        let result = step(
            &m,
            &NavState::Reading { level: 0, unit: 0 },
            Intent::PreviousUnit,
            &ProgressRecord::default(),
        );
        assert_eq!(result, Err(Rejection::NoPreviousUnit));
    }

    #[test]
    fn previous_unit_steps_back_without_touching_level() {
        let m = module(&[3], 1);
        let t = step(
            &m,
            &NavState::Reading { level: 0, unit: 2 },
            Intent::PreviousUnit,
            &ProgressRecord::default(),
        )
        .unwrap();
        assert_eq!(t.state, NavState::Reading { level: 0, unit: 1 });
        assert_eq!(t.patch, Some(ProgressPatch::new().unit(1).quiz_mode(false)));
    }

    #[test]
    fn previous_from_quiz_returns_to_last_unit() {
        let mut h = Harness::new(module(&[3], 1));
        h.send(Intent::JumpToLevel(0)).unwrap();
        for _ in 0..3 {
            h.send(Intent::NextUnit).unwrap();
        }
        assert!(h.progress.quiz_mode_active);

        h.send(Intent::PreviousUnit).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 0, unit: 2 });
        assert!(!h.progress.quiz_mode_active);
        assert_eq!(h.progress.position(), (0, 2));
    }

    #[test]
    fn selecting_overwrites_previous_choice() {
        let mut h = Harness::new(module(&[1], 2));
        h.send(Intent::Start).unwrap();
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "b");
        h.select("q0", "a");
        let NavState::QuizInProgress { selections, .. } = &h.state else {
            panic!("expected quiz");
        };
        assert_eq!(selections.len(), 1);
        assert_eq!(
            selections.get(&QuestionId::new("q0")),
            Some(&OptionId::new("a"))
        );
    }

    #[test]
    fn selecting_unknown_ids_is_rejected() {
        let mut h = Harness::new(module(&[1], 1));
        h.send(Intent::Start).unwrap();
        h.send(Intent::NextUnit).unwrap();

        let unknown_question = h.send(Intent::SelectOption {
            question: QuestionId::new("nope"),
            option: OptionId::new("a"),
        });
        assert_eq!(
            unknown_question,
            Err(Rejection::UnknownQuestion(QuestionId::new("nope")))
        );

        let unknown_option = h.send(Intent::SelectOption {
            question: QuestionId::new("q0"),
            option: OptionId::new("z"),
        });
        assert!(matches!(unknown_option, Err(Rejection::UnknownOption { .. })));
    }

    #[test]
    fn incomplete_submit_is_rejected() {
        let mut h = Harness::new(module(&[1, 1], 2));
        h.send(Intent::Start).unwrap();
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "a");

        let result = h.send(Intent::Submit);

        assert_eq!(
            result,
            Err(Rejection::Incomplete {
                answered: 1,
                total: 2
            })
        );
        assert!(matches!(h.state, NavState::QuizInProgress { .. }));
        assert!(h.progress.completed_level_ids.is_empty());
    }

    #[test]
    fn fail_retry_pass_continue_scenario() {
        let mut h = Harness::new(module(&[1, 1], 2));
        h.send(Intent::Start).unwrap();
        h.send(Intent::NextUnit).unwrap();

        h.select("q0", "a");
        h.select("q1", "b");
        h.send(Intent::Submit).unwrap();
        assert_eq!(h.score().percentage, 50);
        assert!(!h.score().passed);
        assert!(h.progress.completed_level_ids.is_empty());
        assert_eq!(h.send(Intent::Continue), Err(Rejection::NotPassed));

        h.send(Intent::Retry).unwrap();
        assert_eq!(
            h.state,
            NavState::QuizInProgress {
                level: 0,
                selections: Selections::new()
            }
        );

        h.select("q0", "a");
        h.select("q1", "a");
        h.send(Intent::Submit).unwrap();
        assert_eq!(h.score().percentage, 100);
        assert!(h.score().passed);
        assert_eq!(h.progress.completed_level_ids, completed(&[10]));
        assert_eq!(
            h.signals,
            vec![Signal::LevelPassed {
                level_id: LevelId::new(10),
                first_time: true
            }]
        );
        assert_eq!(h.send(Intent::Retry), Err(Rejection::AlreadyPassed));

        h.send(Intent::Continue).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 1, unit: 0 });
        assert_eq!(h.progress.position(), (1, 0));
        assert!(!h.progress.quiz_mode_active);
    }

    #[test]
    fn selections_are_frozen_after_submit() {
        let mut h = Harness::new(module(&[1], 1));
        h.send(Intent::Start).unwrap();
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "b");
        h.send(Intent::Submit).unwrap();

        let result = h.send(Intent::SelectOption {
            question: QuestionId::new("q0"),
            option: OptionId::new("a"),
        });
        assert_eq!(result, Err(Rejection::NotAvailable));
        assert!(!h.score().passed);
    }

    #[test]
    fn passing_twice_is_idempotent() {
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10]),
            ..ProgressRecord::default()
        };
        let mut h = Harness::with_progress(module(&[1, 1], 1), progress);
        h.send(Intent::JumpToLevel(0)).unwrap();
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "a");
        h.send(Intent::Submit).unwrap();

        assert_eq!(h.progress.completed_level_ids, completed(&[10]));
        assert_eq!(
            h.signals,
            vec![Signal::LevelPassed {
                level_id: LevelId::new(10),
                first_time: false
            }]
        );
    }

    #[test]
    fn failing_never_removes_completion() {
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10]),
            ..ProgressRecord::default()
        };
        let mut h = Harness::with_progress(module(&[1, 1], 1), progress);
        h.send(Intent::JumpToLevel(0)).unwrap();
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "b");
        h.send(Intent::Submit).unwrap();
        h.send(Intent::Retry).unwrap();

        assert_eq!(h.progress.completed_level_ids, completed(&[10]));
    }

    #[test]
    fn passing_last_level_completes_module() {
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10]),
            last_level_index: 1,
            last_unit_index: 1,
            ..ProgressRecord::default()
        };
        let mut h = Harness::with_progress(module(&[1, 2], 1), progress);
        h.send(Intent::Start).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 1, unit: 1 });
        h.send(Intent::NextUnit).unwrap();
        h.select("q0", "a");
        h.send(Intent::Submit).unwrap();
        h.send(Intent::Continue).unwrap();

        assert_eq!(h.state, NavState::ModuleComplete);
        assert_eq!(h.signals.last(), Some(&Signal::ModuleCompleted));

        h.send(Intent::AcknowledgeCompletion).unwrap();
        assert_eq!(h.state, NavState::Overview);
        assert_eq!(h.signals.last(), Some(&Signal::NavigateToHub));
    }

    #[test]
    fn jump_rejects_locked_and_out_of_range_levels() {
        let m = module(&[1, 1, 1], 1);
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10]),
            ..ProgressRecord::default()
        };
        let state = NavState::Overview;
        assert_eq!(
            step(&m, &state, Intent::JumpToLevel(2), &progress),
            Err(Rejection::LevelLocked(2))
        );
        assert_eq!(
            step(&m, &state, Intent::JumpToLevel(3), &progress),
            Err(Rejection::LevelOutOfRange(3))
        );
        assert!(step(&m, &state, Intent::JumpToLevel(1), &progress).is_ok());
    }

    #[test]
    fn review_mode_allows_any_jump() {
        let m = module(&[1, 1, 1], 1);
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10, 20, 30]),
            ..ProgressRecord::default()
        };
        let t = step(&m, &NavState::ModuleComplete, Intent::JumpToLevel(2), &progress).unwrap();
        assert_eq!(t.state, NavState::Reading { level: 2, unit: 0 });
    }

    #[test]
    fn jump_resets_quiz_mode_and_unit() {
        let progress = ProgressRecord {
            completed_level_ids: completed(&[10]),
            last_level_index: 1,
            last_unit_index: 2,
            quiz_mode_active: true,
            last_updated: None,
        };
        let mut h = Harness::with_progress(module(&[1, 3], 1), progress);
        h.send(Intent::JumpToLevel(1)).unwrap();

        assert_eq!(h.state, NavState::Reading { level: 1, unit: 0 });
        assert_eq!(h.progress.position(), (1, 0));
        assert!(!h.progress.quiz_mode_active);
    }

    #[test]
    fn resume_quiz_needs_active_quiz_mode() {
        let m = module(&[2, 2], 1);
        let idle = ProgressRecord::default();
        assert_eq!(
            step(&m, &NavState::Overview, Intent::ResumeQuiz, &idle),
            Err(Rejection::QuizNotActive)
        );

        let mid_quiz = ProgressRecord {
            completed_level_ids: completed(&[10]),
            last_level_index: 1,
            last_unit_index: 1,
            quiz_mode_active: true,
            last_updated: None,
        };
        let t = step(&m, &NavState::Overview, Intent::ResumeQuiz, &mid_quiz).unwrap();
        assert_eq!(
            t.state,
            NavState::QuizInProgress {
                level: 1,
                selections: Selections::new()
            }
        );
        assert_eq!(t.patch, None);
    }

    #[test]
    fn overview_is_reachable_from_anywhere_without_persisting() {
        let m = module(&[1], 1);
        let t = step(
            &m,
            &NavState::Reading { level: 0, unit: 0 },
            Intent::OpenOverview,
            &ProgressRecord::default(),
        )
        .unwrap();
        assert_eq!(t.state, NavState::Overview);
        assert!(t.patch.is_none());
    }

    #[test]
    fn stale_position_is_clamped_on_start() {
        let progress = ProgressRecord {
            last_level_index: 9,
            last_unit_index: 9,
            ..ProgressRecord::default()
        };
        let mut h = Harness::with_progress(module(&[1, 2], 1), progress);
        h.send(Intent::Start).unwrap();
        assert_eq!(h.state, NavState::Reading { level: 1, unit: 1 });
    }
}
