use serde::Deserialize;
use std::collections::HashSet;

use crate::model::ContentError;
use crate::model::ids::{OptionId, QuestionId};

//
// ─── ANSWER OPTION ─────────────────────────────────────────────────────────────
//

/// One selectable answer of a `Question`.
///
/// Correctness is not stored on the option; it is implied by the owning
/// question's correct-option id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerOption {
    id: OptionId,
    text: String,
    #[serde(default)]
    explanation: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDraft {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
    correct_option_id: OptionId,
}

/// A single-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
    correct_option_id: OptionId,
}

impl Question {
    /// Creates a question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyOptions` if there are no options,
    /// `ContentError::DuplicateOptionId` if two options share an id, and
    /// `ContentError::MissingCorrectOption` if the correct id matches no option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<AnswerOption>,
        correct_option_id: OptionId,
    ) -> Result<Self, ContentError> {
        if options.is_empty() {
            return Err(ContentError::EmptyOptions { question: id });
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id()) {
                return Err(ContentError::DuplicateOptionId {
                    question: id.clone(),
                    option: option.id().clone(),
                });
            }
        }

        if !seen.contains(&correct_option_id) {
            return Err(ContentError::MissingCorrectOption {
                question: id,
                option: correct_option_id,
            });
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_option_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_option_id(&self) -> &OptionId {
        &self.correct_option_id
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id() == id)
    }

    #[must_use]
    pub fn is_correct(&self, id: &OptionId) -> bool {
        &self.correct_option_id == id
    }
}

impl TryFrom<QuestionDraft> for Question {
    type Error = ContentError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        Self::new(
            draft.id,
            draft.prompt,
            draft.options,
            draft.correct_option_id,
        )
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// The ordered questions gating advancement past a Level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "QuizDraft")]
pub struct Quiz {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct QuizDraft {
    questions: Vec<Question>,
}

impl Quiz {
    /// Creates a quiz from its questions.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyQuiz` if there are no questions and
    /// `ContentError::DuplicateQuestionId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, ContentError> {
        if questions.is_empty() {
            return Err(ContentError::EmptyQuiz);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(ContentError::DuplicateQuestionId {
                    question: question.id().clone(),
                });
            }
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl TryFrom<QuizDraft> for Quiz {
    type Error = ContentError;

    fn try_from(draft: QuizDraft) -> Result<Self, Self::Error> {
        Self::new(draft.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str) -> AnswerOption {
        AnswerOption::new(OptionId::new(id), format!("option {id}"), "")
    }

    #[test]
    fn rejects_question_without_matching_correct_option() {
        let err = Question::new(
            QuestionId::new("q1"),
            "Pick one",
            vec![option("a"), option("b")],
            OptionId::new("z"),
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::MissingCorrectOption { .. }));
    }

    #[test]
    fn rejects_duplicate_option_ids() {
        let err = Question::new(
            QuestionId::new("q1"),
            "Pick one",
            vec![option("a"), option("a")],
            OptionId::new("a"),
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateOptionId { .. }));
    }

    #[test]
    fn rejects_empty_quiz() {
        assert_eq!(Quiz::new(Vec::new()).unwrap_err(), ContentError::EmptyQuiz);
    }

    #[test]
    fn deserializes_question_with_validation() {
        let json = r#"{
            "id": "q1",
            "prompt": "2 + 2?",
            "options": [
                {"id": "a", "text": "3", "explanation": "Off by one."},
                {"id": "b", "text": "4", "explanation": "Correct."}
            ],
            "correctOptionId": "b"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert!(question.is_correct(&OptionId::new("b")));
        assert_eq!(
            question.option(&OptionId::new("a")).unwrap().explanation(),
            "Off by one."
        );

        let bad = json.replace("\"correctOptionId\": \"b\"", "\"correctOptionId\": \"c\"");
        assert!(serde_json::from_str::<Question>(&bad).is_err());
    }
}
