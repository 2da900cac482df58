use crate::{
    cli::{Cli, handlers::commons},
    core::resolver,
};
use anyhow::{Result, anyhow};
use colored::Colorize;

/// Loads and validates the config, then prints the resolved actions of every option.
///
/// Loading already resolves every reference, so reaching the report means the
/// config is usable as-is.
pub fn handle(cli: &Cli, args: Vec<String>) -> Result<()> {
    if !args.is_empty() {
        return Err(anyhow!(t!("error.unexpected_args"), args = args.join(" ")));
    }
    let (path, loaded) = commons::load_config(cli)?;

    for option in &loaded.config.options {
        println!("{}", option.name.cyan().bold());
        for action in resolver::resolve_option(option, &loaded.registry)? {
            println!("  {} {}", "open:".dimmed(), action.setup);
            if let Some(cleanup) = &action.cleanup {
                println!("  {} {}", "close:".dimmed(), cleanup);
            }
        }
        if let Some(backup) = &option.backup {
            println!("  {} {}", "backup:".dimmed(), backup);
        }
    }

    println!(
        "\n{}",
        format!(
            t!("check.info.valid"),
            path = path.display(),
            options = loaded.config.options.len(),
            actions = loaded.registry.len()
        )
        .green()
    );
    Ok(())
}
