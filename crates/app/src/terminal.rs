use std::fmt::Write as _;

use player_core::model::{ModuleId, OptionId, QuestionId};
use player_core::navigation::{Intent, LevelStatus, NavState};
use services::{DispatchOutcome, ModuleSummary, Screen};

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    Usage(&'static str),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "type a command, or `help`"),
            ParseError::Unknown(word) => write!(f, "unknown command: {word}"),
            ParseError::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

pub const HELP: &str = "\
commands:
  start | resume       leave the overview (resume reopens an unfinished quiz)
  n | p                next / previous unit
  s <question> <opt>   select an answer
  submit               grade the quiz
  c | r                continue after a pass / retry after a fail
  j <level>            jump to a level (1-based)
  o                    back to the overview
  ack                  acknowledge module completion
  reset                forget progress for this module
  q                    quit";

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };

    let intent = match head {
        "start" => Intent::Start,
        "resume" => Intent::ResumeQuiz,
        "n" | "next" => Intent::NextUnit,
        "p" | "prev" => Intent::PreviousUnit,
        "s" | "select" => {
            let (Some(question), Some(option)) = (words.next(), words.next()) else {
                return Err(ParseError::Usage("s <question> <option>"));
            };
            Intent::SelectOption {
                question: QuestionId::new(question),
                option: OptionId::new(option),
            }
        }
        "submit" => Intent::Submit,
        "c" | "continue" => Intent::Continue,
        "r" | "retry" => Intent::Retry,
        "j" | "jump" => {
            let level = words
                .next()
                .and_then(|raw| raw.parse::<usize>().ok())
                .filter(|level| *level > 0)
                .ok_or(ParseError::Usage("j <level>"))?;
            Intent::JumpToLevel(level - 1)
        }
        "o" | "overview" => Intent::OpenOverview,
        "ack" => Intent::AcknowledgeCompletion,
        "reset" => return Ok(Command::Reset),
        "h" | "help" | "?" => return Ok(Command::Help),
        "q" | "quit" | "exit" => return Ok(Command::Quit),
        other => return Err(ParseError::Unknown(other.to_owned())),
    };
    Ok(Command::Intent(intent))
}

/// Prompt shown before each input line.
pub fn prompt(state: &NavState) -> &'static str {
    match state {
        NavState::Overview => "overview> ",
        NavState::Reading { .. } => "read> ",
        NavState::QuizInProgress { .. } => "quiz> ",
        NavState::QuizResult { .. } => "result> ",
        NavState::ModuleComplete => "done> ",
    }
}

fn status_marker(status: LevelStatus) -> &'static str {
    match status {
        LevelStatus::Completed => "[x]",
        LevelStatus::Available => "[ ]",
        LevelStatus::Locked => "[-]",
    }
}

pub fn render_screen(screen: &Screen) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_screen(&mut out, screen);
    out
}

fn write_screen(out: &mut String, screen: &Screen) -> std::fmt::Result {
    match screen {
        Screen::Overview(view) => {
            writeln!(out, "== {} ==", view.title)?;
            if let Some(name) = &view.learner_name {
                writeln!(out, "Welcome back, {name}.")?;
            }
            if let Some(description) = &view.description {
                writeln!(out, "{description}")?;
            }
            writeln!(
                out,
                "{}/{} levels complete ({}%){}",
                view.completed_count,
                view.total_levels,
                view.percent_complete,
                if view.review_mode { ", review mode" } else { "" }
            )?;
            for row in &view.levels {
                writeln!(
                    out,
                    "{} {}{}. {} ({} units, {} questions)",
                    if row.is_current { ">" } else { " " },
                    status_marker(row.status),
                    row.index + 1,
                    row.title,
                    row.unit_count,
                    row.question_count
                )?;
            }
            let resume = &view.resume;
            if resume.is_fresh {
                writeln!(out, "`start` to begin.")?;
            } else if resume.quiz_mode_active {
                writeln!(
                    out,
                    "`resume` to reopen the quiz of {}, or `start` to read.",
                    resume.level_title
                )?;
            } else {
                writeln!(
                    out,
                    "`start` to continue {} at unit {}.",
                    resume.level_title,
                    resume.unit_index + 1
                )?;
            }
        }
        Screen::Reading(view) => {
            writeln!(
                out,
                "-- {} · unit {}/{}: {} --",
                view.level_title,
                view.unit_index + 1,
                view.unit_count,
                view.unit_title
            )?;
            writeln!(out, "{}", view.content)?;
            writeln!(
                out,
                "{}{}",
                if view.has_previous { "`p` back, " } else { "" },
                if view.is_last_unit {
                    "`n` to take the quiz"
                } else {
                    "`n` next"
                }
            )?;
        }
        Screen::Quiz(view) => {
            writeln!(
                out,
                "-- {} quiz ({}/{} answered) --",
                view.level_title, view.answered, view.total
            )?;
            for question in &view.questions {
                writeln!(out, "[{}] {}", question.id, question.prompt)?;
                for option in &question.options {
                    let marker = if question.selected.as_ref() == Some(&option.id) {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(out, "  {marker} {}) {}", option.id, option.text)?;
                }
            }
            if view.can_submit {
                writeln!(out, "`submit` when ready.")?;
            }
        }
        Screen::Result(view) => {
            let score = &view.score;
            writeln!(
                out,
                "-- {} result: {}/{} ({}%) {} --",
                view.level_title,
                score.correct_count,
                score.total_count,
                score.percentage,
                if score.passed { "passed" } else { "not passed" }
            )?;
            for item in &score.feedback {
                writeln!(
                    out,
                    "  {} {}{}",
                    if item.is_correct { "ok " } else { "bad" },
                    item.question_id,
                    if item.explanation.is_empty() {
                        String::new()
                    } else {
                        format!(": {}", item.explanation)
                    }
                )?;
            }
            if view.completes_module {
                writeln!(out, "`c` to finish the module.")?;
            } else if view.can_continue {
                writeln!(out, "`c` for the next level.")?;
            } else if view.can_retry {
                writeln!(out, "`r` to try again.")?;
            }
        }
        Screen::Complete(view) => {
            match &view.learner_name {
                Some(name) => writeln!(out, "Well done, {name}!")?,
                None => writeln!(out, "Well done!")?,
            }
            writeln!(
                out,
                "You finished all {} levels of {}. `ack` to return.",
                view.total_levels, view.title
            )?;
        }
    }
    Ok(())
}

/// One-line note for outcomes worth calling out, if any.
pub fn describe_outcome(outcome: &DispatchOutcome) -> Option<String> {
    match outcome {
        DispatchOutcome::Moved => None,
        DispatchOutcome::Rejected(rejection) => Some(format!("not now: {rejection}")),
        DispatchOutcome::LevelPassed {
            first_time: true, ..
        } => Some("Level complete!".to_owned()),
        DispatchOutcome::LevelPassed { .. } => Some("Passed again.".to_owned()),
        DispatchOutcome::ModuleCompleted => Some("Module complete!".to_owned()),
        DispatchOutcome::NavigateToHub => Some("Back to the module list.".to_owned()),
    }
}

pub fn render_summaries(summaries: &[ModuleSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{} {:<24} {}/{}{}",
            if summary.is_active { "*" } else { " " },
            summary.id,
            summary.completed,
            summary.total,
            if summary.is_finished() { "  done" } else { "" }
        );
    }
    out
}

/// Modules whose progress is still stored but are gone from the catalog.
pub fn render_orphaned(ids: &[ModuleId]) -> String {
    let mut out = String::from("stored progress for modules not in the catalog:\n");
    for id in ids {
        let _ = writeln!(out, "  {id}");
    }
    out
}
