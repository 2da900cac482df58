//! # System Interaction Layer
//!
//! This module is the boundary between the launcher logic and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns one external process at a time and waits for it. Argument
//!   lists are executed directly, plain strings go through the platform shell
//!   (`sh -c` or `cmd /C`). Exit codes are returned to the caller, which decides
//!   whether a non-zero status is fatal.

pub mod executor;
