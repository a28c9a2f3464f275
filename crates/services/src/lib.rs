#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod navigation;
pub mod progress_store;

pub use player_core::Clock;

pub use app_services::{AppServices, ModuleSummary};
pub use catalog::{Catalog, ContentRegistry};
pub use error::{AppServicesError, CatalogError, NavigationError};
pub use navigation::{
    CompletionView, DispatchOutcome, LevelRow, NavigationController, OptionView, OverviewView,
    QuestionView, QuizView, ReadingView, ResultView, ResumePoint, Screen,
};
pub use progress_store::ProgressStore;
