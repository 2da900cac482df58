//! # Action Resolver
//!
//! Turns the action references of an option into concrete [`Action`]s.
//!
//! Resolution order:
//! 1. A reference that carries its own `open` command is used as written. It
//!    shadows a global action with the same name, which is how an option
//!    overrides a shared definition.
//! 2. Anything else (a bare name, or a mapping without `open`) must exist in the
//!    global [`ActionRegistry`].
use crate::{
    core::config_loader::ConfigError,
    models::{Action, ActionDef, ActionRef, OptionDef},
};
use std::collections::HashMap;

/// The immutable table of global actions, built once at load time.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
    order: Vec<String>,
}

impl ActionRegistry {
    /// Builds the registry from the `actions` section. Names must be unique.
    pub fn from_definitions(definitions: &[ActionDef]) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for def in definitions {
            if registry.actions.contains_key(&def.name) {
                return Err(ConfigError::DuplicateAction(def.name.clone()));
            }
            registry.order.push(def.name.clone());
            registry.actions.insert(def.name.clone(), Action::from(def));
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over the actions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.order.iter().filter_map(|name| self.actions.get(name))
    }
}

/// Resolves one reference of `option` into an action.
pub fn resolve(
    reference: &ActionRef,
    option: &OptionDef,
    registry: &ActionRegistry,
) -> Result<Action, ConfigError> {
    if let ActionRef::Entry(entry) = reference {
        if let Some(open) = &entry.open {
            if registry.get(&entry.name).is_some() {
                log::debug!(
                    "Inline action '{}' in option '{}' shadows the global action of the same name",
                    entry.name,
                    option.name
                );
            }
            return Ok(Action {
                name: entry.name.clone(),
                setup: open.clone(),
                cleanup: entry.close.clone(),
                desc: entry.desc.clone(),
            });
        }
        if entry.close.is_some() {
            log::warn!(
                "Action '{}' in option '{}' has 'close' but no 'open'; using the global definition",
                entry.name,
                option.name
            );
        }
    }

    let name = reference.name();
    let mut action = registry
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownAction {
            action: name.to_string(),
            option: option.name.clone(),
        })?;
    if let ActionRef::Entry(entry) = reference {
        if entry.desc.is_some() {
            action.desc.clone_from(&entry.desc);
        }
    }
    Ok(action)
}

/// Resolves every reference of `option`, in order. Nothing is executed here,
/// so an unknown name is reported before the first setup command runs.
pub fn resolve_option(
    option: &OptionDef,
    registry: &ActionRegistry,
) -> Result<Vec<Action>, ConfigError> {
    option
        .actions
        .iter()
        .map(|reference| resolve(reference, option, registry))
        .collect()
}
