use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Single-screen to-do list with categories.
/// Tasks are stored as JSON under the data directory; run without a
/// subcommand to open the interactive screen.
#[derive(Parser)]
#[command(name = "todo", version, about = "Categorised to-do list for the terminal")]
pub struct Cli {
    /// Directory holding the task store (overrides the config file).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Do not fetch starter tasks when the list is empty.
    #[arg(long, global = true)]
    pub no_seed: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
