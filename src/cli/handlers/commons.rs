// This module contains shared functions used by multiple handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use std::{
    io::{self, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use crate::{
    cli::Cli,
    core::{
        config_loader::{self, LoadedConfig},
        paths,
    },
};

/// Resolves the config path from the CLI flags and loads the validated config.
pub fn load_config(cli: &Cli) -> Result<(PathBuf, LoadedConfig)> {
    let path = paths::resolve_config_path(cli.config.as_deref())?;
    let loaded = config_loader::load_config(&path)?;
    Ok((path, loaded))
}

/// Prints the "done" line followed by a one-second countdown.
pub fn countdown(seconds: u64) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", t!("run.info.done").green().bold()).context("Failed to write to stdout")?;
    if seconds > 0 {
        write!(stdout, " -").context("Failed to write to stdout")?;
    }
    for remaining in (1..=seconds).rev() {
        write!(stdout, " {remaining}").context("Failed to write to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        thread::sleep(Duration::from_secs(1));
    }
    writeln!(stdout).context("Failed to write to stdout")?;
    Ok(())
}

/// Joins the positional words into one option key so that names with spaces
/// work without quoting.
pub fn option_key(args: &[String]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    }
}
