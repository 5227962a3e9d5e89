mod calendar;
mod cli;
mod commands;
mod config;
mod dates;
mod diary;
mod layout;
mod model;
mod render;
mod ui;

use anyhow::Result;
use clap::Parser;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging();
    let config = args.config.as_deref();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Tui => commands::tui(config),
        cli::Command::Open { date } => commands::open(config, date),
        cli::Command::Stats => commands::stats(config),
    }
}

/// Logs go to a file so they never draw over the TUI.
fn init_logging() {
    let filter = EnvFilter::try_from_env("LIFE_CALENDAR_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let log_file = ProjectDirs::from("", "", "life-calendar").and_then(|dirs| {
        let dir = dirs.data_local_dir();
        std::fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("life-calendar.log"))
            .ok()
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);
    let _ = match log_file {
        Some(file) => builder.with_writer(Mutex::new(file)).try_init(),
        None => builder.with_writer(io::sink).try_init(),
    };
}
