//! # Core Logic
//!
//! - **`config_loader`**: reads and validates the configuration document.
//! - **`resolver`**: the global action registry and reference resolution.
//! - **`execution_stack`**: ordered acquisition and reverse-order release of actions.
//! - **`menu`**: the numbered option menu and its input abstraction.
//! - **`runner`**: the state machine tying a run together.
//! - **`paths`**: locating the configuration file.

pub mod config_loader;
pub mod execution_stack;
pub mod menu;
pub mod paths;
pub mod resolver;
pub mod runner;
