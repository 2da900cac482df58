//! # Runner
//!
//! Drives one run through its states:
//!
//! ```text
//! SelectingOption -> Acquiring -> Running -> Unwinding -> Done
//!                        |           |
//!                        +-----------+-> Failed
//! ```
//!
//! Every path that leaves `Acquiring` or `Running` passes through `Unwinding`
//! exactly once. A failed setup is unwound by the [`ExecutionStack`] itself; the
//! backup step and normal completion are unwound here.
use crate::{
    constants::FAILURE_EXIT_CODE,
    core::{
        config_loader::{ConfigError, LoadedConfig},
        execution_stack::{ExecutionStack, StackError, UnwindReport},
        menu::{self, MenuError, Prompt},
        resolver,
    },
    models::{Command, OptionDef},
    system::executor::{CommandExecutor, ExecutionError, ExitState},
};
use colored::Colorize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Menu(#[from] MenuError),
    #[error(transparent)]
    Setup(#[from] StackError),
    #[error("Executing backup call '{command}' of option '{option}' finished with {status}")]
    BackupFailed {
        option: String,
        command: String,
        status: ExitState,
    },
    #[error("Backup call of option '{option}' could not be executed: {source}")]
    BackupNotExecuted {
        option: String,
        #[source]
        source: ExecutionError,
    },
}

impl RunError {
    /// The process exit code for this failure: the failing command's own
    /// status when there is one, otherwise [`FAILURE_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        let status = match self {
            Self::Setup(error) => error.status(),
            Self::BackupFailed { status, .. } => Some(*status),
            _ => None,
        };
        status
            .and_then(ExitState::failure_code)
            .filter(|code| (1..=255).contains(code))
            .unwrap_or(FAILURE_EXIT_CODE)
    }
}

/// The states of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    SelectingOption,
    Acquiring,
    Running,
    Unwinding,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub option: String,
    /// Number of actions that were set up.
    pub acquired: usize,
    pub unwind: UnwindReport,
}

/// Orchestrates selection, acquisition, the backup step and the unwind.
pub struct Runner<'a> {
    config: &'a LoadedConfig,
    executor: &'a dyn CommandExecutor,
    state: RunState,
    trail: Vec<RunState>,
}

impl fmt::Debug for Runner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a LoadedConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            config,
            executor,
            state: RunState::SelectingOption,
            trail: vec![RunState::SelectingOption],
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn trail(&self) -> &[RunState] {
        &self.trail
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Runner state: {} -> {}", self.state, next);
        self.state = next;
        self.trail.push(next);
    }

    fn begin_unwind(&mut self) {
        self.transition(RunState::Unwinding);
        println!("{}", t!("run.info.cleanup").dimmed());
    }

    /// Prints the configured banner lines.
    pub fn print_title(&self) {
        for line in &self.config.config.title {
            println!("{}", line.bold());
        }
    }

    /// Selects the option to run: by `key` if given, otherwise through the menu.
    pub fn select<P: Prompt + ?Sized>(
        &mut self,
        key: Option<&str>,
        prompt: &mut P,
    ) -> Result<&'a OptionDef, RunError> {
        if self.state != RunState::SelectingOption {
            self.transition(RunState::SelectingOption);
        }
        let config: &'a LoadedConfig = self.config;
        let options = config.config.options.as_slice();
        let chosen = match key {
            Some(key) => menu::select_by_key(options, key),
            None => menu::choose(options, prompt),
        };
        chosen.map_err(|e| {
            self.transition(RunState::Failed);
            RunError::from(e)
        })
    }

    /// Runs `option`: sets up every action in order, runs the backup step and
    /// unwinds. Cleanup warnings are printed and reported, they do not fail the run.
    pub fn run(&mut self, option: &OptionDef) -> Result<RunOutcome, RunError> {
        self.transition(RunState::Acquiring);
        println!(
            "{}",
            format!(t!("run.info.running"), option = option.name).green().bold()
        );

        let actions = match resolver::resolve_option(option, &self.config.registry) {
            Ok(actions) => actions,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e.into());
            }
        };

        // Normal exits release explicitly below; the guard only fires while a panic unwinds.
        let mut stack = scopeguard::guard_on_unwind(ExecutionStack::new(self.executor), |mut stack| {
            stack.release_all();
        });

        for action in actions {
            println!("{} {}", "→".blue(), action.label().cyan());
            if let Err(error) = stack.acquire(action) {
                // The stack has already released everything it held.
                self.begin_unwind();
                print_warnings(error.unwind());
                self.transition(RunState::Failed);
                return Err(error.into());
            }
        }
        let acquired = stack.len();

        self.transition(RunState::Running);
        let backup_result = match &option.backup {
            Some(command) => self.run_backup(option, command),
            None => Ok(()),
        };

        self.begin_unwind();
        let unwind = stack.release_all();
        print_warnings(&unwind);

        match backup_result {
            Ok(()) => {
                self.transition(RunState::Done);
                Ok(RunOutcome {
                    option: option.name.clone(),
                    acquired,
                    unwind,
                })
            }
            Err(e) => {
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    fn run_backup(&self, option: &OptionDef, command: &Command) -> Result<(), RunError> {
        println!("{}", t!("run.info.backup_banner").yellow().bold());
        match self.executor.execute(command, false) {
            Ok(result) if result.success() => Ok(()),
            Ok(result) => Err(RunError::BackupFailed {
                option: option.name.clone(),
                command: command.to_string(),
                status: result.status,
            }),
            Err(source) => Err(RunError::BackupNotExecuted {
                option: option.name.clone(),
                source,
            }),
        }
    }
}

fn print_warnings(report: &UnwindReport) {
    for warning in &report.warnings {
        println!(
            "{}: {}",
            t!("run.warn.label").yellow().bold(),
            warning.to_string().yellow()
        );
    }
}
