use crate::model::{
    AnswerOption, Level, LevelId, Module, ModuleId, OptionId, Question, QuestionId, Quiz, Unit,
    UnitId,
};

/// Builds a module whose levels have ids 10, 20, 30, ... and the given unit counts.
///
/// Every quiz has `questions` questions `q0..qN`, each with options `a`
/// (correct) and `b`.
pub(crate) fn module(units_per_level: &[usize], questions: usize) -> Module {
    let levels = units_per_level
        .iter()
        .enumerate()
        .map(|(index, units)| {
            let id = (u32::try_from(index).unwrap() + 1) * 10;
            let units = (0..*units)
                .map(|u| Unit::new(UnitId::new(format!("l{id}-u{u}")), format!("Unit {u}"), "body"))
                .collect();
            let questions = (0..questions)
                .map(|q| {
                    Question::new(
                        QuestionId::new(format!("q{q}")),
                        format!("Question {q}"),
                        vec![
                            AnswerOption::new(OptionId::new("a"), "right", "a is right"),
                            AnswerOption::new(OptionId::new("b"), "wrong", "b is wrong"),
                        ],
                        OptionId::new("a"),
                    )
                    .unwrap()
                })
                .collect();
            Level::new(
                LevelId::new(id),
                format!("Level {id}"),
                units,
                Quiz::new(questions).unwrap(),
            )
            .unwrap()
        })
        .collect();
    Module::new(ModuleId::new("test-module"), "Test module", None, levels).unwrap()
}
