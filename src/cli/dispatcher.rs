use anyhow::Result;

use crate::cli::{Cli, handlers};

/// Defines a command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(&Cli, Vec<String>) -> Result<()>,
}

/// Called when no command is named.
const RUN_COMMAND: CommandDefinition = CommandDefinition {
    name: "run",
    aliases: &["start"],
    handler: handlers::run::handle,
};

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    RUN_COMMAND,
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "check",
        aliases: &["validate"],
        handler: handlers::check::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Splits the positional arguments into the handler to call and its arguments.
///
/// - `backup-starter` runs the interactive menu.
/// - `backup-starter <command> [args...]` calls the command.
/// - `backup-starter <option>` is a shortcut for `run <option>`.
fn route(args: &[String]) -> (&'static CommandDefinition, Vec<String>) {
    match args.split_first() {
        Some((first, rest)) => match find_command(first) {
            Some(command) => (command, rest.to_vec()),
            None => (&RUN_COMMAND, args.to_vec()),
        },
        None => (&RUN_COMMAND, Vec::new()),
    }
}

/// The main application dispatcher.
pub fn dispatch(cli: &Cli) -> Result<()> {
    log::debug!("Dispatching args: {:?}", cli.args);

    let (command, handler_args) = route(&cli.args);
    log::debug!("Routing to '{}' with {:?}", command.name, handler_args);
    (command.handler)(cli, handler_args)
}
