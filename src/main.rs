//! # todo - Categorised To-Do List
//!
//! A single-screen to-do list for the terminal. Tasks carry one of three
//! categories (home, work, other), can be completed, deleted or cleared in
//! bulk, and are persisted locally across restarts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive screen
//! todo
//!
//! # Add a task from the shell
//! todo add "Pay the electricity bill" --category home
//!
//! # List, toggle and delete
//! todo list
//! todo toggle 3
//! todo delete 3
//!
//! # Bulk clears ask before removing anything
//! todo clear-completed
//! todo clear-all --yes
//! ```
//!
//! On first launch with an empty list, three starter tasks are fetched from
//! a public placeholder API. Pass `--no-seed` or set `seed.enabled = false`
//! in the config file to skip it.
//!
//! Data is stored as a single JSON array in `todos.json` under the data
//! directory (`--data-dir`, `storage.data_dir`, or the platform data dir).
//! Logging is controlled with `TODO_LOG` (an `EnvFilter` directive) and
//! `TODO_LOG_FORMAT=json|compact`; the interactive screen logs to
//! `todo.log` in the data directory.

use std::env;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod seed;
pub mod storage;
pub mod task;
pub mod todos;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{load_config, Config};
use db::TaskRepository;
use seed::HttpSeedSource;
use storage::FileStore;
use todos::TodoList;
use tui::app::SeedPlan;

const LOG_FILE: &str = "todo.log";

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(mut cli: Cli) -> Result<()> {
    let command = cli.command.take().unwrap_or(Commands::Ui);
    let open_list = || -> Result<TodoList> { Session::start(&cli, false)?.open_list() };

    match command {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Ui => {
            let session = Session::start(&cli, true)?;
            let plan = (session.config.seed.enabled && !cli.no_seed).then(|| SeedPlan {
                source: Box::new(session.seed_source()),
                count: session.config.seed.count,
            });
            cmd_ui(TodoList::new(session.repo), plan)
        }
        Commands::Seed => {
            let session = Session::start(&cli, false)?;
            let source = session.seed_source();
            let count = session.config.seed.count;
            cmd_seed(&mut session.open_list()?, &source, count)
        }
        Commands::Add { text, category } => cmd_add(&mut open_list()?, &text, category),
        Commands::List => {
            cmd_list(&open_list()?);
            Ok(())
        }
        Commands::Toggle { id } => cmd_toggle(&mut open_list()?, &id),
        Commands::Delete { id } => cmd_delete(&mut open_list()?, &id),
        Commands::ClearCompleted { yes } => cmd_clear_completed(&mut open_list()?, yes),
        Commands::ClearAll { yes } => cmd_clear_all(&mut open_list()?, yes),
    }
}

/// Config, tracing and the task repository for one run.
struct Session {
    config: Config,
    repo: TaskRepository,
}

impl Session {
    fn start(cli: &Cli, interactive: bool) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
        let store = FileStore::open(&data_dir)
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;

        init_tracing(interactive.then(|| data_dir.join(LOG_FILE)).as_deref());
        tracing::debug!(data_dir = %data_dir.display(), key = %config.storage.key, "opened store");

        let repo = TaskRepository::with_key(Box::new(store), config.storage.key.clone());
        Ok(Session { config, repo })
    }

    fn seed_source(&self) -> HttpSeedSource {
        HttpSeedSource::new(self.config.seed.endpoint.clone(), self.config.seed.timeout())
    }

    fn open_list(self) -> Result<TodoList> {
        Ok(TodoList::open(self.repo)?)
    }
}

/// Install the global subscriber. With `log_file` set (interactive screen),
/// events go to that file; otherwise to stderr.
fn init_tracing(log_file: Option<&Path>) {
    let default_filter = if log_file.is_some() { "todo=info,warn" } else { "todo=warn" };
    let filter = EnvFilter::try_from_env("TODO_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    let json = env::var("TODO_LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match log_file {
        Some(path) => {
            let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
                // Nowhere safe to write while the screen is up.
                return;
            };
            let writer = Mutex::new(file);
            if json {
                registry.with(fmt::layer().json().with_writer(writer)).try_init()
            } else {
                registry.with(fmt::layer().compact().with_ansi(false).with_writer(writer)).try_init()
            }
        }
        None => {
            if json {
                registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).try_init()
            } else {
                registry.with(fmt::layer().compact().with_writer(std::io::stderr)).try_init()
            }
        }
    };
    if let Err(e) = installed {
        eprintln!("warning: logging not initialised: {e}");
    }
}
