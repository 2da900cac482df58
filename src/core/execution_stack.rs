//! # Execution Stack
//!
//! Acquires actions strictly in the given order and releases them strictly in
//! reverse order. The stack only ever holds actions whose setup succeeded.
//!
//! - [`ExecutionStack::acquire`] runs the setup command. A non-zero exit status
//!   (or a setup that cannot be spawned) is fatal: everything acquired so far is
//!   released before the error is returned.
//! - [`ExecutionStack::release_all`] runs the cleanup commands from the most
//!   recent action to the oldest. A failing cleanup becomes a [`CleanupWarning`]
//!   and the remaining cleanups still run. Releasing an empty stack does nothing,
//!   so each acquired action is cleaned up exactly once.
use crate::{
    models::Action,
    system::executor::{CommandExecutor, ExecutionResult, ExitState},
};
use std::fmt;
use thiserror::Error;

/// An action whose setup succeeded, kept until its cleanup has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredResource {
    pub action: Action,
    pub setup_result: ExecutionResult,
}

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Executing setup call '{command}' of action '{action}' finished with {status} - giving up!")]
    SetupFailed {
        action: String,
        command: String,
        status: ExitState,
        /// What happened while unwinding the actions acquired before.
        unwind: UnwindReport,
    },
    #[error("Setup call of action '{action}' could not be executed: {source}")]
    SetupNotExecuted {
        action: String,
        #[source]
        source: crate::system::executor::ExecutionError,
        unwind: UnwindReport,
    },
}

impl StackError {
    /// The report of the unwind that ran before this error was returned.
    pub fn unwind(&self) -> &UnwindReport {
        match self {
            Self::SetupFailed { unwind, .. } | Self::SetupNotExecuted { unwind, .. } => unwind,
        }
    }

    /// The exit status of the failed setup, if the command ran at all.
    pub fn status(&self) -> Option<ExitState> {
        match self {
            Self::SetupFailed { status, .. } => Some(*status),
            Self::SetupNotExecuted { .. } => None,
        }
    }
}

/// Why a cleanup did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupFailure {
    /// The cleanup ran and finished unsuccessfully.
    Status(ExitState),
    /// The cleanup could not be started.
    NotExecuted(String),
}

/// A non-fatal problem found while unwinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub action: String,
    pub command: String,
    pub failure: CleanupFailure,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            CleanupFailure::Status(status) => write!(
                f,
                "Executing cleanup call '{}' of action '{}' finished with {}",
                self.command, self.action, status
            ),
            CleanupFailure::NotExecuted(reason) => write!(
                f,
                "Cleanup call '{}' of action '{}' could not be executed: {}",
                self.command, self.action, reason
            ),
        }
    }
}

/// The result of one unwind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnwindReport {
    /// Names of the released actions, in release order.
    pub released: Vec<String>,
    pub warnings: Vec<CleanupWarning>,
}

impl UnwindReport {
    /// `true` if every cleanup succeeded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The ordered list of acquired actions.
pub struct ExecutionStack<'a> {
    executor: &'a dyn CommandExecutor,
    resources: Vec<AcquiredResource>,
}

impl fmt::Debug for ExecutionStack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStack")
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl<'a> ExecutionStack<'a> {
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self {
            executor,
            resources: Vec::new(),
        }
    }

    /// Number of currently held resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The held resources, oldest first.
    pub fn resources(&self) -> &[AcquiredResource] {
        &self.resources
    }

    /// Runs the setup of `action` and pushes it onto the stack.
    ///
    /// On failure the stack is unwound completely before the error is returned,
    /// so the caller never has to clean up a partial setup.
    pub fn acquire(&mut self, action: Action) -> Result<AcquiredResource, StackError> {
        log::debug!("Acquiring action '{}': {}", action.name, action.setup);

        let result = match self.executor.execute(&action.setup, action.needs_setup_output()) {
            Ok(result) => result,
            Err(source) => {
                let unwind = self.release_all();
                let error = StackError::SetupNotExecuted {
                    action: action.name,
                    source,
                    unwind,
                };
                log::debug!("{}", error);
                return Err(error);
            }
        };

        if !result.success() {
            let unwind = self.release_all();
            let error = StackError::SetupFailed {
                command: action.setup.to_string(),
                action: action.name,
                status: result.status,
                unwind,
            };
            log::debug!("{}", error);
            return Err(error);
        }

        let resource = AcquiredResource {
            action,
            setup_result: result,
        };
        self.resources.push(resource.clone());
        Ok(resource)
    }

    /// Releases every held resource, most recent first.
    pub fn release_all(&mut self) -> UnwindReport {
        let mut report = UnwindReport::default();
        if !self.resources.is_empty() {
            log::debug!("Unwinding {} acquired action(s)", self.resources.len());
        }
        while let Some(resource) = self.resources.pop() {
            if let Some(warning) = self.release(&resource) {
                log::debug!("{}", warning);
                report.warnings.push(warning);
            }
            report.released.push(resource.action.name);
        }
        report
    }

    fn release(&self, resource: &AcquiredResource) -> Option<CleanupWarning> {
        let cleanup = resource.action.cleanup.as_ref()?;
        let command = match resource.setup_result.output.as_deref() {
            Some(output) if cleanup.references_output() => cleanup.with_output(output.trim()),
            _ => cleanup.clone(),
        };
        log::debug!("Releasing action '{}': {}", resource.action.name, command);

        let failure = match self.executor.execute(&command, false) {
            Ok(result) if result.success() => return None,
            Ok(result) => CleanupFailure::Status(result.status),
            Err(e) => CleanupFailure::NotExecuted(e.to_string()),
        };
        Some(CleanupWarning {
            action: resource.action.name.clone(),
            command: command.to_string(),
            failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Command;
    use crate::system::executor::fake::RecordingExecutor;

    fn action(name: &str) -> Action {
        Action::new(name, Command::Shell(format!("open {}", name)))
            .with_cleanup(Command::Shell(format!("close {}", name)))
    }

    #[test]
    fn test_release_runs_in_reverse_order() {
        // --- Setup ---
        let executor = RecordingExecutor::new();
        let mut stack = ExecutionStack::new(&executor);

        // --- Execute ---
        for name in ["a", "b", "c"] {
            stack.acquire(action(name)).unwrap();
        }
        assert_eq!(stack.len(), 3);
        let report = stack.release_all();

        // --- Assert ---
        assert_eq!(
            executor.calls(),
            vec!["open a", "open b", "open c", "close c", "close b", "close a"]
        );
        assert_eq!(report.released, vec!["c", "b", "a"]);
        assert!(report.is_clean());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_failed_setup_unwinds_previous_actions() {
        let executor = RecordingExecutor::new().exit_with("open c", 1);
        let mut stack = ExecutionStack::new(&executor);

        stack.acquire(action("a")).unwrap();
        stack.acquire(action("b")).unwrap();
        let err = stack.acquire(action("c")).unwrap_err();

        assert_eq!(
            executor.calls(),
            vec!["open a", "open b", "open c", "close b", "close a"]
        );
        assert!(stack.is_empty());
        assert_eq!(err.status(), Some(ExitState::Code(1)));
        assert_eq!(err.unwind().released, vec!["b", "a"]);
        assert!(err.to_string().contains("'open c'"));
        assert!(err.to_string().contains("returncode 1"));
    }

    #[test]
    fn test_unspawnable_setup_is_fatal_too() {
        let executor = RecordingExecutor::new().unavailable("open b");
        let mut stack = ExecutionStack::new(&executor);

        stack.acquire(action("a")).unwrap();
        let err = stack.acquire(action("b")).unwrap_err();

        assert!(matches!(err, StackError::SetupNotExecuted { .. }));
        assert_eq!(err.status(), None);
        assert_eq!(executor.calls(), vec!["open a", "open b", "close a"]);
    }

    #[test]
    fn test_failing_cleanup_does_not_stop_unwind() {
        let executor = RecordingExecutor::new()
            .exit_with("close b", 3)
            .unavailable("close c");
        let mut stack = ExecutionStack::new(&executor);

        for name in ["a", "b", "c"] {
            stack.acquire(action(name)).unwrap();
        }
        let report = stack.release_all();

        assert_eq!(
            executor.calls(),
            vec!["open a", "open b", "open c", "close c", "close b", "close a"]
        );
        assert_eq!(report.released, vec!["c", "b", "a"]);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(report.warnings[0].failure, CleanupFailure::NotExecuted(_)));
        assert_eq!(
            report.warnings[1].failure,
            CleanupFailure::Status(ExitState::Code(3))
        );
    }

    #[test]
    fn test_second_release_is_a_no_op() {
        let executor = RecordingExecutor::new();
        let mut stack = ExecutionStack::new(&executor);
        stack.acquire(action("a")).unwrap();

        let first = stack.release_all();
        let second = stack.release_all();

        assert_eq!(first.released, vec!["a"]);
        assert!(second.released.is_empty());
        assert_eq!(executor.calls(), vec!["open a", "close a"]);
    }

    #[test]
    fn test_actions_without_cleanup_are_released_silently() {
        let executor = RecordingExecutor::new();
        let mut stack = ExecutionStack::new(&executor);
        stack
            .acquire(Action::new("backup", Command::Shell("backintime".to_string())))
            .unwrap();

        let report = stack.release_all();

        assert_eq!(executor.calls(), vec!["backintime"]);
        assert_eq!(report.released, vec!["backup"]);
    }

    #[test]
    fn test_cleanup_receives_setup_output() {
        let executor = RecordingExecutor::new().print("losetup -f --show img", "/dev/loop3\n");
        let mut stack = ExecutionStack::new(&executor);
        let loop_device = Action::new("loop", Command::Shell("losetup -f --show img".to_string()))
            .with_cleanup(Command::Shell("losetup -d {output}".to_string()));

        let acquired = stack.acquire(loop_device).unwrap();
        assert_eq!(stack.resources().last(), Some(&acquired));
        assert_eq!(acquired.setup_result.output.as_deref(), Some("/dev/loop3\n"));
        stack.release_all();

        assert_eq!(
            executor.calls(),
            vec!["losetup -f --show img", "losetup -d /dev/loop3"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_undecodable_setup_output_is_still_cleaned_up() {
        use crate::system::executor::SystemExecutor;

        let dir = tempfile::TempDir::new().unwrap();
        let log_path = dir.path().join("log.txt");
        let log = log_path.display();
        let executor = SystemExecutor;
        let mut stack = ExecutionStack::new(&executor);
        let device = Action::new(
            "loop",
            Command::Shell(format!("echo mounted >> '{log}'; printf 'dev\\377'")),
        )
        .with_cleanup(Command::Shell(format!("echo closed {{output}} >> '{log}'")));

        stack.acquire(device).unwrap();
        let report = stack.release_all();

        assert!(report.is_clean());
        assert_eq!(report.released, vec!["loop"]);
        assert_eq!(
            std::fs::read_to_string(&log_path).unwrap(),
            "mounted\nclosed dev\u{FFFD}\n"
        );
    }

    /// Collects what this module logs at warn level or above.
    struct LoudRecords(std::sync::Mutex<Vec<String>>);

    impl log::Log for LoudRecords {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if record.level() <= log::Level::Warn && record.target() == "backup_starter::core::execution_stack" {
                if let Ok(mut records) = self.0.lock() {
                    records.push(record.args().to_string());
                }
            }
        }

        fn flush(&self) {}
    }

    static LOUD_RECORDS: LoudRecords = LoudRecords(std::sync::Mutex::new(Vec::new()));

    #[test]
    fn test_failures_are_left_to_the_console() {
        log::set_logger(&LOUD_RECORDS).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
        let executor = RecordingExecutor::new()
            .exit_with("close a", 1)
            .exit_with("open b", 2);
        let mut stack = ExecutionStack::new(&executor);

        stack.acquire(action("a")).unwrap();
        let err = stack.acquire(action("b")).unwrap_err();

        assert_eq!(err.unwind().warnings.len(), 1);
        assert!(LOUD_RECORDS.0.lock().unwrap().is_empty());
    }
}
