use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "life-calendar",
    version,
    about = "Lifetime month grid with a per-day diary"
)]
pub struct Cli {
    /// Path to a config.yml (defaults to ./life-calendar.yml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive calendar
    Tui,
    /// Open the diary note for a day in the configured editor
    Open {
        /// Day to open in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print lifetime progress and diary coverage
    Stats,
}
