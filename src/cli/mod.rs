use crate::{constants::DEFAULT_COUNTDOWN_SECS, constants::FAILURE_EXIT_CODE, core::runner::RunError};
use clap::Parser;

pub mod dispatcher;
pub mod handlers;

/// ANSI styles for the markup tags used in the help template.
const HELP_TAGS: [(&str, &str); 3] = [("title", "\x1b[1;33m"), ("cmd", "\x1b[36m"), ("dim", "\x1b[2m")];

/// Replaces the `<tag>`/`</tag>` markup of `template` with ANSI styles, or strips it.
fn render_help(template: &str, use_colors: bool) -> String {
    HELP_TAGS.iter().fold(template.to_string(), |help, (tag, style)| {
        let (open, close) = if use_colors { (*style, "\x1b[0m") } else { ("", "") };
        help.replace(&format!("<{tag}>"), open)
            .replace(&format!("</{tag}>"), close)
    })
}

fn help_template() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
    // clap keeps the template for the whole process.
    Box::leak(render_help(t!("cli.help.template"), use_colors).into_boxed_str())
}

/// backup-starter: sets up a backup target, runs the backup and tears everything down again.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { help_template() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Configuration file (YAML, JSON or TOML).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Run this option (name or 1-based number) without showing the menu.
    #[arg(short = 'o', long = "option", value_name = "NAME|N")]
    pub option: Option<String>,

    /// Do not wait for <ENTER> on errors and skip the final countdown.
    #[arg(long)]
    pub no_wait: bool,

    /// Seconds to count down before exiting after a run.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_COUNTDOWN_SECS)]
    pub countdown: u64,

    /// The command and its arguments. Anything that is not a command is
    /// passed to `run` as the option to start.
    #[arg()]
    pub args: Vec<String>,
}

/// Maps an error that reached the top level to the process exit code.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<RunError>()
        .map_or(FAILURE_EXIT_CODE, RunError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::execution_stack::{StackError, UnwindReport};
    use crate::system::executor::ExitState;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["backup-starter", "-c", "~/backup.yaml", "--no-wait", "run", "NAS"]);
        assert_eq!(cli.config.as_deref(), Some("~/backup.yaml"));
        assert_eq!(cli.option, None);
        assert!(cli.no_wait);
        assert_eq!(cli.countdown, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(cli.args, vec!["run", "NAS"]);

        let cli = Cli::parse_from(["backup-starter", "--option", "2", "--countdown", "0"]);
        assert_eq!(cli.option.as_deref(), Some("2"));
        assert_eq!(cli.countdown, 0);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_help_markup_is_rendered_or_stripped() {
        let template = "<title>USAGE:</title> <cmd>run</cmd> <dim>(default)</dim>";

        assert_eq!(render_help(template, false), "USAGE: run (default)");
        assert_eq!(
            render_help(template, true),
            "\x1b[1;33mUSAGE:\x1b[0m \x1b[36mrun\x1b[0m \x1b[2m(default)\x1b[0m"
        );
        assert!(!render_help(t!("cli.help.template"), false).contains('<'));
    }

    #[test]
    fn test_exit_code_propagates_setup_status() {
        let error = anyhow::Error::from(RunError::Setup(StackError::SetupFailed {
            action: "mount".to_string(),
            command: "mount /mnt".to_string(),
            status: ExitState::Code(32),
            unwind: UnwindReport::default(),
        }));
        assert_eq!(exit_code_for(&error), 32);

        let signal = anyhow::Error::from(RunError::BackupFailed {
            option: "NAS".to_string(),
            command: "backintime".to_string(),
            status: ExitState::Signal,
        });
        assert_eq!(exit_code_for(&signal), FAILURE_EXIT_CODE);

        let other = anyhow::anyhow!("anything else");
        assert_eq!(exit_code_for(&other), FAILURE_EXIT_CODE);
    }
}
