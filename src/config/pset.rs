//! Parameter sets: named bundles of typed option values.

use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A module's option mapping.
///
/// Option names are unique; the map is ordered by name so resolved output is
/// deterministic. A pset starts as the module's default option set and is
/// mutated in place by era modifiers until the registry freezes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pset {
    options: BTreeMap<String, Value>,
}

impl Pset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option at definition time, replacing any previous value.
    pub fn insert(&mut self, option: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(option.into(), value.into());
    }

    /// Builder-style `insert` for declaring defaults inline.
    pub fn with(mut self, option: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(option, value);
        self
    }

    pub fn get(&self, option: &str) -> Option<&Value> {
        self.options.get(option)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.options.contains_key(option)
    }

    /// Look up a dotted path through nested psets,
    /// e.g. `regressionConfig.regressionKeyEB`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        let mut parts = path.split('.').peekable();
        while let Some(part) = parts.next() {
            let value = current.get(part)?;
            if parts.peek().is_none() {
                return Some(value);
            }
            current = value.as_pset()?;
        }
        None
    }

    /// Overwrite an existing option in place.
    ///
    /// Missing options are a schema error: modifiers may only patch options
    /// the module already declares.
    pub fn set(&mut self, module: &str, option: &str, value: Value) -> ConfigResult<()> {
        match self.options.get_mut(option) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ConfigError::option_not_found(module, option)),
        }
    }

    /// Value-copy this pset with overrides applied on top.
    ///
    /// Strict: every override key must already exist in the source. Nested
    /// psets are replaced wholesale, never merged. The result is independent
    /// of the source.
    pub fn clone_with<I>(&self, module: &str, overrides: I) -> ConfigResult<Pset>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut cloned = self.clone();
        for (option, value) in overrides {
            cloned.set(module, &option, value)?;
        }
        Ok(cloned)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.options.iter()
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }
}
