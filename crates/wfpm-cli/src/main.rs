//! wfpm CLI
//!
//! The command-line interface for developing, releasing and installing
//! workflow packages.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use wfpm_core::Settings;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}: tracing already initialized", "warning".yellow().bold());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let cwd = std::env::current_dir()?;
    let settings = Settings::from_env();
    tracing::debug!(cwd = %cwd.display(), ?settings, "Starting wfpm");

    match cli.command {
        Commands::Install { force, skip_tests } => {
            commands::run_install(&cwd, settings, force, skip_tests)
        }
        Commands::List => commands::run_list(&cwd, settings),
        Commands::Test => commands::run_test(&cwd, settings),
        Commands::Workon { pkg, stop, update } => {
            commands::run_workon(&cwd, settings, pkg.as_deref(), stop, update)
        }
        Commands::Nextver { pkg, version } => {
            commands::run_nextver(&cwd, settings, &pkg, &version)
        }
    }
}
