// src/constants.rs

/// The name of the directory holding the default configuration (inside the user config dir).
pub const CONFIG_DIR_NAME: &str = "backup-starter";

/// The file looked up inside [`CONFIG_DIR_NAME`] when no `-c` option is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.yaml";

/// Placeholder in a cleanup command that is replaced by the captured setup output.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Seconds counted down on the console before the process exits after a run.
pub const DEFAULT_COUNTDOWN_SECS: u64 = 3;

/// Exit code used when a failure carries no usable exit status of its own.
pub const FAILURE_EXIT_CODE: i32 = 1;
