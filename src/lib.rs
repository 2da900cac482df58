//! # backup-starter
//!
//! Sets up a backup target from a list of paired open/close commands, runs the
//! backup program and tears every step down again in reverse order, even when
//! something in the middle fails.
//!
//! The crate is split into:
//! - **`models`**: the configuration document and the resolved [`models::Action`].
//! - **`core`**: loading, resolution, the execution stack, the menu and the runner.
//! - **`system`**: spawning external commands.
//! - **`cli`**: argument parsing and the command handlers.

// Must come first so that `t!` is visible in every module below.
include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
