// src/bin/backup-starter.rs

use backup_starter::{
    cli::{self, Cli},
    t,
};
use clap::Parser;
use colored::Colorize;
use dialoguer::console::Term;
use std::io::{self, Write};

fn main() {
    // Errors and warnings only, unless RUST_LOG says otherwise.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::debug!("CLI args parsed: {:?}", cli);

    // The entire application logic is wrapped in a Result to enable centralized error handling.
    if let Err(e) = cli::dispatcher::dispatch(&cli) {
        eprintln!("\n{}: {}", t!("main.error.label").red().bold(), e);
        if !cli.no_wait {
            wait_for_enter();
        }
        std::process::exit(cli::exit_code_for(&e));
    }
}

/// Keeps the window open until the user has read the error.
fn wait_for_enter() {
    print!("{} ", t!("main.prompt.exit").dimmed());
    let _ = io::stdout().flush();
    // Returns immediately when stdout is not a terminal.
    let _ = Term::stdout().read_line();
}
