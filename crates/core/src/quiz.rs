use std::collections::BTreeMap;

use crate::model::{OptionId, QuestionId, Quiz};

/// Minimum percentage of correct answers needed to pass a quiz.
pub const PASS_THRESHOLD_PERCENT: u8 = 60;

/// Learner choices keyed by question. One option per question.
pub type Selections = BTreeMap<QuestionId, OptionId>;

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Per-question outcome used by the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFeedback {
    pub question_id: QuestionId,
    pub selected: Option<OptionId>,
    pub correct_option_id: OptionId,
    pub is_correct: bool,
    /// Explanation of the selected option, or of the correct one when unanswered.
    pub explanation: String,
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Result of scoring one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizScore {
    pub correct_count: usize,
    pub total_count: usize,
    /// Rounded to the nearest integer, halves up.
    pub percentage: u8,
    pub passed: bool,
    pub feedback: Vec<QuestionFeedback>,
}

impl QuizScore {
    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total_count - self.correct_count
    }
}

/// Scores `selections` against `quiz`.
///
/// Unanswered questions count as incorrect and selections for questions the
/// quiz does not contain are ignored. A quiz without questions scores 0%.
#[must_use]
pub fn score(quiz: &Quiz, selections: &Selections) -> QuizScore {
    let feedback: Vec<QuestionFeedback> = quiz
        .questions()
        .iter()
        .map(|question| {
            let selected = selections.get(question.id()).cloned();
            let is_correct = selected
                .as_ref()
                .is_some_and(|option| question.is_correct(option));
            let explained = selected
                .as_ref()
                .unwrap_or_else(|| question.correct_option_id());
            let explanation = question
                .option(explained)
                .map(|option| option.explanation().to_owned())
                .unwrap_or_default();

            QuestionFeedback {
                question_id: question.id().clone(),
                selected,
                correct_option_id: question.correct_option_id().clone(),
                is_correct,
                explanation,
            }
        })
        .collect();

    let correct_count = feedback.iter().filter(|f| f.is_correct).count();
    let total_count = feedback.len();
    let percentage = percentage(correct_count, total_count);

    QuizScore {
        correct_count,
        total_count,
        percentage,
        passed: percentage >= PASS_THRESHOLD_PERCENT,
        feedback,
    }
}

/// `round(correct / total * 100)` in integer arithmetic, halves rounded up.
#[must_use]
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let rounded = (correct * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

/// Number of the quiz's questions that have a selection.
#[must_use]
pub fn answered_count(quiz: &Quiz, selections: &Selections) -> usize {
    quiz.questions()
        .iter()
        .filter(|question| selections.contains_key(question.id()))
        .count()
}

/// True once every question of the quiz has a selection.
#[must_use]
pub fn is_fully_answered(quiz: &Quiz, selections: &Selections) -> bool {
    answered_count(quiz, selections) == quiz.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Question};

    fn question(id: &str, correct: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("question {id}"),
            vec![
                AnswerOption::new(OptionId::new("a"), "A", format!("{id}: a explained")),
                AnswerOption::new(OptionId::new("b"), "B", format!("{id}: b explained")),
            ],
            OptionId::new(correct),
        )
        .unwrap()
    }

    fn quiz(n: usize) -> Quiz {
        Quiz::new((0..n).map(|i| question(&format!("q{i}"), "a")).collect()).unwrap()
    }

    fn answer(pairs: &[(&str, &str)]) -> Selections {
        pairs
            .iter()
            .map(|(q, o)| (QuestionId::new(*q), OptionId::new(*o)))
            .collect()
    }

    #[test]
    fn half_correct_fails() {
        let result = score(&quiz(2), &answer(&[("q0", "a"), ("q1", "b")]));
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_count, 2);
        assert_eq!(result.percentage, 50);
        assert!(!result.passed);
    }

    #[test]
    fn all_correct_passes() {
        let result = score(&quiz(2), &answer(&[("q0", "a"), ("q1", "a")]));
        assert_eq!(result.percentage, 100);
        assert!(result.passed);
        assert_eq!(result.incorrect_count(), 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 3 of 5 is exactly 60%.
        let selections = answer(&[("q0", "a"), ("q1", "a"), ("q2", "a"), ("q3", "b")]);
        let result = score(&quiz(5), &selections);
        assert_eq!(result.percentage, 60);
        assert!(result.passed);
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let result = score(&quiz(3), &answer(&[("q0", "a")]));
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 33);
        assert!(!result.passed);
        let unanswered = &result.feedback[1];
        assert_eq!(unanswered.selected, None);
        assert_eq!(unanswered.explanation, "q1: a explained");
    }

    #[test]
    fn feedback_explains_selected_option() {
        let result = score(&quiz(1), &answer(&[("q0", "b")]));
        assert_eq!(result.feedback[0].explanation, "q0: b explained");
        assert_eq!(result.feedback[0].correct_option_id, OptionId::new("a"));
    }

    #[test]
    fn unknown_questions_are_ignored() {
        let result = score(&quiz(1), &answer(&[("q0", "a"), ("zz", "a")]));
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn scoring_is_deterministic() {
        let q = quiz(4);
        let selections = answer(&[("q0", "a"), ("q2", "b"), ("q3", "a")]);
        assert_eq!(score(&q, &selections), score(&q, &selections));
    }

    #[test]
    fn percentage_and_pass_flag_agree_for_every_ratio() {
        for total in 1..=12 {
            let q = quiz(total);
            for correct in 0..=total {
                let selections: Selections = (0..total)
                    .map(|i| {
                        let option = if i < correct { "a" } else { "b" };
                        (QuestionId::new(format!("q{i}")), OptionId::new(option))
                    })
                    .collect();
                let result = score(&q, &selections);
                let expected = (correct as f64 / total as f64 * 100.0 + 0.5).floor() as u8;
                assert_eq!(result.percentage, expected, "{correct}/{total}");
                assert_eq!(result.passed, result.percentage >= PASS_THRESHOLD_PERCENT);
            }
        }
    }

    #[test]
    fn rounding_halves_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn fully_answered_requires_every_question() {
        let q = quiz(2);
        assert!(!is_fully_answered(&q, &answer(&[("q0", "a")])));
        assert!(is_fully_answered(&q, &answer(&[("q0", "a"), ("q1", "b")])));
    }
}
