mod controller;
mod view;

pub use controller::{DispatchOutcome, NavigationController};
pub use view::{
    CompletionView, LevelRow, OptionView, OverviewView, QuestionView, QuizView, ReadingView,
    ResultView, ResumePoint, Screen,
};
