// src/models.rs

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

use crate::constants::OUTPUT_PLACEHOLDER;

// --- COMMAND MODEL ---

/// A command as written in the configuration file.
///
/// Uses `untagged` so a YAML/JSON list becomes [`Command::Argv`] and a plain
/// string becomes [`Command::Shell`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Command {
    /// Argument tokens, executed directly. No word splitting, globbing or expansion.
    Argv(Vec<String>),
    /// A command line handed to the platform shell. Pipes and redirects work,
    /// but the line must never be built from untrusted input.
    Shell(String),
}

impl Command {
    /// Returns `true` if there is nothing to execute.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Argv(tokens) => tokens.first().is_none_or(|program| program.trim().is_empty()),
            Self::Shell(line) => line.trim().is_empty(),
        }
    }

    /// Returns `true` if the command contains the `{output}` placeholder.
    pub fn references_output(&self) -> bool {
        match self {
            Self::Argv(tokens) => tokens.iter().any(|t| t.contains(OUTPUT_PLACEHOLDER)),
            Self::Shell(line) => line.contains(OUTPUT_PLACEHOLDER),
        }
    }

    /// Returns a copy with every `{output}` placeholder replaced by `output`.
    ///
    /// For [`Command::Argv`] the substitution happens per token, so the value
    /// stays a single argument even if it contains spaces. For [`Command::Shell`]
    /// the value is shell-quoted first, so it is never re-parsed as syntax.
    pub fn with_output(&self, output: &str) -> Self {
        match self {
            Self::Argv(tokens) => Self::Argv(
                tokens
                    .iter()
                    .map(|t| t.replace(OUTPUT_PLACEHOLDER, output))
                    .collect(),
            ),
            Self::Shell(line) => {
                // Only an interior NUL is unquotable, and such a line cannot be spawned anyway.
                let quoted = shlex::try_quote(output).map_or_else(|_| output.to_string(), Cow::into_owned);
                Self::Shell(line.replace(OUTPUT_PLACEHOLDER, &quoted))
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argv(tokens) => {
                let joined = shlex::try_join(tokens.iter().map(String::as_str))
                    .unwrap_or_else(|_| tokens.join(" "));
                f.write_str(&joined)
            }
            Self::Shell(line) => f.write_str(line),
        }
    }
}

// --- CONFIGURATION FILE MODELS ---
// These mirror the document read from disk.

/// An entry of the global `actions` section. `open` is mandatory here.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionDef {
    pub name: String,
    pub open: Command,
    #[serde(default)]
    pub close: Option<Command>,
    /// Text printed instead of the name while the action is set up.
    #[serde(default)]
    pub desc: Option<String>,
}

/// An action written as a mapping inside an option.
///
/// With `open` it defines the action inline; without it, `name` refers to the
/// global `actions` section.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub name: String,
    #[serde(default)]
    pub open: Option<Command>,
    #[serde(default)]
    pub close: Option<Command>,
    #[serde(default)]
    pub desc: Option<String>,
}

/// A reference to an action inside an option.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActionRef {
    /// A bare name, always looked up in the global registry.
    Name(String),
    /// A mapping, either inline or a lookup by its `name`.
    Entry(ActionEntry),
}

impl ActionRef {
    /// The name the reference is known by.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Entry(entry) => &entry.name,
        }
    }
}

/// A selectable backup target.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<ActionRef>,
    /// Backup program run after every action has been set up.
    #[serde(default)]
    pub backup: Option<Command>,
}

/// The whole configuration document.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupConfig {
    /// Banner lines printed above the menu.
    #[serde(default)]
    pub title: Vec<String>,
    /// Actions that options may reference by name.
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub options: Vec<OptionDef>,
}

// --- IN-MEMORY MODELS ---

/// A resolved action: the unit the execution stack acquires and releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub setup: Command,
    pub cleanup: Option<Command>,
    pub desc: Option<String>,
}

impl Action {
    /// Creates an action without cleanup or description.
    pub fn new(name: impl Into<String>, setup: Command) -> Self {
        Self {
            name: name.into(),
            setup,
            cleanup: None,
            desc: None,
        }
    }

    /// Sets the cleanup command.
    pub fn with_cleanup(mut self, cleanup: Command) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// The text shown to the user for this action.
    pub fn label(&self) -> &str {
        self.desc.as_deref().unwrap_or(&self.name)
    }

    /// Whether the setup output has to be captured for the cleanup.
    pub fn needs_setup_output(&self) -> bool {
        self.cleanup.as_ref().is_some_and(Command::references_output)
    }
}

impl From<&ActionDef> for Action {
    fn from(def: &ActionDef) -> Self {
        Self {
            name: def.name.clone(),
            setup: def.open.clone(),
            cleanup: def.close.clone(),
            desc: def.desc.clone(),
        }
    }
}
