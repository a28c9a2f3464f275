use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use player_core::model::ModuleId;
use services::{AppServices, Catalog, Clock, DispatchOutcome, NavigationController};
use tokio::io::{AsyncBufReadExt, BufReader};

mod database;
mod logging;
mod terminal;

use database::ProgressDb;

use terminal::{Command as PlayCommand, HELP, describe_outcome, parse_command};

const DEFAULT_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/catalog.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- play    [--db <sqlite_url>] [--catalog <path>] [--module <id>] [--name <learner>]"
    );
    eprintln!("  cargo run -p app -- modules [--db <sqlite_url>] [--catalog <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:player.sqlite3");
    eprintln!("  --catalog crates/app/assets/catalog.json");
    eprintln!("  --module  last active module, else the first in the catalog");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PLAYER_DB_URL, PLAYER_CATALOG, PLAYER_MODULE, PLAYER_NAME, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Modules,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "modules" => Some(Self::Modules),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db: ProgressDb,
    catalog: PathBuf,
    module: Option<ModuleId>,
    learner_name: Option<String>,
}

fn parse_db(raw: &str, base: &Path) -> Result<ProgressDb, ArgsError> {
    ProgressDb::parse(raw, base).ok_or_else(|| ArgsError::InvalidDbUrl {
        raw: raw.to_owned(),
    })
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut db = parse_db(
            &non_empty_env("PLAYER_DB_URL").unwrap_or_else(|| "sqlite:player.sqlite3".into()),
            &base,
        )?;
        let mut catalog = non_empty_env("PLAYER_CATALOG")
            .map_or_else(|| PathBuf::from(DEFAULT_CATALOG), PathBuf::from);
        let mut module = non_empty_env("PLAYER_MODULE").map(ModuleId::new);
        let mut learner_name = non_empty_env("PLAYER_NAME");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    db = parse_db(&require_value(args, "--db")?, &base)?;
                }
                "--catalog" => catalog = PathBuf::from(require_value(args, "--catalog")?),
                "--module" => module = Some(ModuleId::new(require_value(args, "--module")?)),
                "--name" => learner_name = Some(require_value(args, "--name")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db,
            catalog,
            module,
            learner_name,
        })
    }
}

async fn play(
    services: &AppServices,
    mut nav: NavigationController,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", terminal::render_screen(&nav.screen()));

    loop {
        print!("{}", terminal::prompt(nav.state()));
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            PlayCommand::Quit => {
                let progress = nav.progress();
                println!(
                    "{}: {}/{} levels complete.",
                    nav.module().title(),
                    progress.completed_count(),
                    nav.module().level_count()
                );
                return Ok(());
            }
            PlayCommand::Help => println!("{HELP}"),
            PlayCommand::Reset => match nav.reset_progress().await {
                Ok(()) => println!("Progress cleared."),
                Err(err) => {
                    tracing::error!(error = %err, "reset failed");
                    println!("could not reset progress: {err}");
                }
            },
            PlayCommand::Intent(intent) => match nav.dispatch(intent).await {
                Ok(outcome) => {
                    if let Some(note) = describe_outcome(&outcome) {
                        println!("{note}");
                    }
                    if matches!(outcome, DispatchOutcome::Rejected(_)) {
                        continue;
                    }
                    if outcome == DispatchOutcome::NavigateToHub {
                        print!(
                            "{}",
                            terminal::render_summaries(&services.module_summaries().await)
                        );
                        return Ok(());
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "progress not saved");
                    println!("could not save progress, staying here: {err}");
                    continue;
                }
            },
        }

        println!("{}", terminal::render_screen(&nav.screen()));
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = Catalog::from_path(&parsed.catalog)?;
    parsed.db.ensure_exists()?;
    let services = AppServices::new_sqlite(&parsed.db.url(), Clock::default_clock(), catalog).await?;

    match cmd {
        Command::Modules => {
            print!(
                "{}",
                terminal::render_summaries(&services.module_summaries().await)
            );
            let orphaned = services.orphaned_progress().await?;
            if !orphaned.is_empty() {
                print!("{}", terminal::render_orphaned(&orphaned));
            }
            Ok(())
        }
        Command::Play => {
            let Some(module_id) = services.resolve_module(parsed.module.as_ref()).await else {
                eprintln!("catalog {} has no modules", parsed.catalog.display());
                return Ok(());
            };
            let Some(nav) = services
                .enter_module(&module_id, parsed.learner_name)
                .await
            else {
                eprintln!("module {module_id} not found");
                return Ok(());
            };
            play(&services, nav).await
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_tracing("info");
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
