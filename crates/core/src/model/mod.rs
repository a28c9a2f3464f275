mod ids;
mod module;
mod progress;
mod question;

pub use ids::{LevelId, ModuleId, OptionId, ParseIdError, QuestionId, UnitId};
pub use module::{ContentError, Level, Module, Unit};
pub use progress::{ProgressPatch, ProgressRecord};
pub use question::{AnswerOption, Question, Quiz};
