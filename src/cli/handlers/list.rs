use crate::{
    cli::{Cli, handlers::commons},
    models::ActionRef,
};
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Prints the numbered options of the config together with their action chains.
pub fn handle(cli: &Cli, args: Vec<String>) -> Result<()> {
    if !args.is_empty() {
        return Err(anyhow!(t!("error.unexpected_args"), args = args.join(" ")));
    }
    let (path, loaded) = commons::load_config(cli)?;

    println!(
        "{}",
        format!(t!("list.info.header"), path = path.display()).bold()
    );
    for (index, option) in loaded.config.options.iter().enumerate() {
        let chain: Vec<&str> = option.actions.iter().map(ActionRef::name).collect();
        println!(
            "{:>3}: {}  {}",
            index + 1,
            option.name.cyan(),
            chain.join(" → ").dimmed()
        );
    }
    Ok(())
}
