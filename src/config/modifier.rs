//! Era modifiers: named conditional override sets.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One override: overwrite `option` of `module` with `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub module: String,
    pub option: String,
    pub value: Value,
}

/// A named detector-operation era with the patches to apply while it is the
/// active era (e.g. `run2_common`, `run2_HI_specific`, `pA_2016`).
///
/// Registering a modifier declares the patches; nothing is applied until the
/// registry's resolution pass runs, and only if the era is flagged active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraModifier {
    era: String,
    patches: Vec<Patch>,
}

impl EraModifier {
    pub fn new(era: impl Into<String>) -> Self {
        Self {
            era: era.into(),
            patches: Vec::new(),
        }
    }

    /// Append a patch. Patches apply in the order they were added.
    pub fn modify(
        mut self,
        module: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.patches.push(Patch {
            module: module.into(),
            option: option.into(),
            value: value.into(),
        });
        self
    }

    pub fn era(&self) -> &str {
        &self.era
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }
}
