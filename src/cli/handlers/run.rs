use crate::{
    cli::{Cli, handlers::commons},
    core::{
        menu::{StreamPrompt, TermPrompt},
        runner::Runner,
    },
    system::executor::SystemExecutor,
};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, IsTerminal};

///
/// Main entry point for the 'run' command.
/// `--option` or the arguments name the option to start; otherwise the menu is shown.
///
pub fn handle(cli: &Cli, args: Vec<String>) -> Result<()> {
    let key = cli.option.clone().or_else(|| commons::option_key(&args));
    let (_, loaded) = commons::load_config(cli)?;

    let executor = SystemExecutor;
    let mut runner = Runner::new(&loaded, &executor);
    runner.print_title();

    let option = if key.is_some() || io::stdin().is_terminal() {
        runner.select(key.as_deref(), &mut TermPrompt)?
    } else {
        // Piped input: read the choice line by line without a terminal.
        let mut prompt = StreamPrompt::new(io::stdin().lock(), io::stdout());
        runner.select(None, &mut prompt)?
    };
    println!();

    let outcome = runner.run(option)?;
    log::info!(
        "Option '{}' finished: {} action(s) set up, {} released",
        outcome.option,
        outcome.acquired,
        outcome.unwind.released.len()
    );

    if !outcome.unwind.is_clean() {
        println!(
            "{}",
            format!(t!("run.warn.summary"), count = outcome.unwind.warnings.len()).yellow()
        );
    }

    if !cli.no_wait {
        commons::countdown(cli.countdown)?;
    }
    Ok(())
}
