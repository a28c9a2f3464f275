//! Module progression state machine.
//!
//! Transitions are pure: [`step`] maps the current state, an intent and the
//! stored progress to the next state plus the patch the caller must persist.

mod machine;
mod state;
mod unlock;

#[cfg(test)]
pub(crate) mod tests_support;

pub use machine::step;
pub use state::{Intent, NavState, Rejection, Signal, Transition};
pub use unlock::{LevelStatus, is_level_unlocked, is_review_mode, level_status};
