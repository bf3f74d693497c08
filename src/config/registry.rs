//! Central registry of module parameter sets and era modifiers.
//!
//! The registry is built once during a single synchronous load pass:
//! modules are defined (or cloned), modifiers are registered, and `freeze`
//! applies every registered modifier in registration order before handing
//! back an immutable snapshot. Any undefined module/option reference or
//! duplicate definition aborts the load.

use crate::config::modifier::EraModifier;
use crate::config::pset::Pset;
use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Mutable configuration registry used during the load pass.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modules: BTreeMap<String, Pset>,
    modifiers: Vec<EraModifier>,
    active_eras: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag an era as active. The environment decides which eras are on;
    /// the registry only records the answer.
    pub fn activate_era(&mut self, era: impl Into<String>) {
        self.active_eras.insert(era.into());
    }

    pub fn activate_eras<I, S>(&mut self, eras: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for era in eras {
            self.activate_era(era);
        }
    }

    pub fn is_era_active(&self, era: &str) -> bool {
        self.active_eras.contains(era)
    }

    /// Register a new module with its default option set.
    pub fn define(&mut self, name: impl Into<String>, defaults: Pset) -> ConfigResult<()> {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return Err(ConfigError::duplicate_module(&name));
        }
        debug!(module = %name, options = defaults.len(), "defined module");
        self.modules.insert(name, defaults);
        Ok(())
    }

    /// Create a new module by value-copying `source`'s current options and
    /// applying `overrides` on top. Changes to the source after the clone do
    /// not propagate.
    pub fn clone_module<I>(
        &mut self,
        source: &str,
        new_name: impl Into<String>,
        overrides: I,
    ) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let new_name = new_name.into();
        let cloned = self
            .modules
            .get(source)
            .ok_or_else(|| ConfigError::module_not_found(source))?
            .clone_with(&new_name, overrides)?;
        self.define(new_name, cloned)
    }

    /// Declare a conditional patch set. Nothing is applied here.
    pub fn register_modifier(&mut self, modifier: EraModifier) {
        self.modifiers.push(modifier);
    }

    /// Apply one modifier now, if its era is active.
    ///
    /// Each patch fully overwrites the named option in place; sequence
    /// values are replaced, never appended to. Re-applying the same modifier
    /// is idempotent. When several active modifiers target the same option,
    /// the last one applied wins.
    pub fn apply(&mut self, modifier: &EraModifier) -> ConfigResult<()> {
        if !self.is_era_active(modifier.era()) {
            debug!(era = modifier.era(), "era inactive, modifier skipped");
            return Ok(());
        }
        for patch in modifier.patches() {
            let pset = self
                .modules
                .get_mut(&patch.module)
                .ok_or_else(|| ConfigError::module_not_found(&patch.module))?;
            pset.set(&patch.module, &patch.option, patch.value.clone())?;
            debug!(
                era = modifier.era(),
                module = %patch.module,
                option = %patch.option,
                "applied era patch"
            );
        }
        Ok(())
    }

    /// Apply all registered modifiers in registration order.
    pub fn apply_modifiers(&mut self) -> ConfigResult<()> {
        let modifiers = std::mem::take(&mut self.modifiers);
        for modifier in &modifiers {
            self.apply(modifier)?;
        }
        self.modifiers = modifiers;
        Ok(())
    }

    /// Read-only view of a module's current option mapping.
    pub fn resolve(&self, module: &str) -> ConfigResult<&Pset> {
        self.modules
            .get(module)
            .ok_or_else(|| ConfigError::module_not_found(module))
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn modifiers(&self) -> &[EraModifier] {
        &self.modifiers
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Run the resolution pass and hand off the final configuration.
    ///
    /// Applies every registered modifier in order, then consumes the
    /// registry. The snapshot is immutable; its lifetime ends at the
    /// external execution engine.
    pub fn freeze(mut self) -> ConfigResult<ResolvedConfig> {
        self.apply_modifiers()?;
        Ok(ResolvedConfig {
            modules: self.modules,
        })
    }
}

/// Immutable resolved configuration, ready for hand-off.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
    modules: BTreeMap<String, Pset>,
}

impl ResolvedConfig {
    pub fn get(&self, module: &str) -> Option<&Pset> {
        self.modules.get(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Pset)> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
