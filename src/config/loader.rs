//! Fragment file loader.
//!
//! Loads declarative YAML configuration fragments and installs them into a
//! [`Registry`]. Fragments in one directory are applied in lexicographic
//! file order, which fixes the modifier registration order across files.

use crate::config::modifier::{EraModifier, Patch};
use crate::config::pset::Pset;
use crate::config::registry::Registry;
use crate::error::ConfigError;
use crate::value::Value;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One parsed fragment file.
///
/// ```yaml
/// modules:
///   triggerEffTest:
///     diagnosticPrescale: 1
///     hwSources: [TM, DDU]
/// clones:
///   - name: triggerEffTestOnline
///     from: triggerEffTest
///     overrides:
///       runOnline: true
/// modifiers:
///   - era: run2_common
///     patches:
///       - module: triggerEffTest
///         option: hwSources
///         value: [TM]
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fragment {
    /// New module definitions with their default option sets.
    #[serde(default)]
    pub modules: BTreeMap<String, Pset>,

    /// Prototype clones, processed after this fragment's definitions.
    #[serde(default)]
    pub clones: Vec<CloneDecl>,

    /// Era modifiers, registered in sequence order.
    #[serde(default)]
    pub modifiers: Vec<ModifierDecl>,
}

/// Declarative clone-with-override.
#[derive(Debug, Serialize, Deserialize)]
pub struct CloneDecl {
    pub name: String,
    pub from: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

/// Declarative era modifier.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModifierDecl {
    pub era: String,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

impl Fragment {
    /// Parse a fragment from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::parse)
    }

    /// Install this fragment's definitions, clones, and modifiers.
    pub fn install(&self, registry: &mut Registry) -> Result<(), ConfigError> {
        for (name, defaults) in &self.modules {
            registry.define(name.clone(), defaults.clone())?;
        }
        for clone in &self.clones {
            registry.clone_module(
                &clone.from,
                clone.name.clone(),
                clone
                    .overrides
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            )?;
        }
        for decl in &self.modifiers {
            let mut modifier = EraModifier::new(decl.era.clone());
            for patch in &decl.patches {
                modifier = modifier.modify(
                    patch.module.clone(),
                    patch.option.clone(),
                    patch.value.clone(),
                );
            }
            registry.register_modifier(modifier);
        }
        Ok(())
    }
}

/// Fragment directory locations, lowest to highest priority.
#[derive(Debug, Clone)]
pub struct FragmentPaths {
    /// Explicit directory (CLI flag or `PSET_FRAGMENTS_DIR`).
    pub explicit_dir: Option<PathBuf>,
    /// Project-level fragments (`./fragments`).
    pub project_dir: Option<PathBuf>,
    /// User-level fragments (`~/.pset-config/fragments`).
    pub user_dir: Option<PathBuf>,
}

impl Default for FragmentPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl FragmentPaths {
    /// Discover fragment directories from environment and defaults.
    pub fn discover() -> Self {
        let explicit_dir = std::env::var("PSET_FRAGMENTS_DIR").ok().map(PathBuf::from);

        let user_dir = std::env::var("PSET_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".pset-config")))
            .map(|d| d.join("fragments"));

        Self {
            explicit_dir,
            project_dir: Some(PathBuf::from("fragments")),
            user_dir,
        }
    }

    /// Create paths with an explicit directory only.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit_dir: Some(dir.into()),
            project_dir: None,
            user_dir: None,
        }
    }

    /// First existing directory, in priority order.
    pub fn effective_dir(&self) -> Option<&Path> {
        [&self.explicit_dir, &self.project_dir, &self.user_dir]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .find(|d| d.is_dir())
    }
}

/// Loads fragment files and builds the configuration registry.
#[derive(Debug)]
pub struct FragmentLoader {
    paths: FragmentPaths,
    registry: Registry,
    loaded_files: Vec<PathBuf>,
}

impl FragmentLoader {
    /// Load fragments from discovered paths into a fresh registry.
    pub fn load(active_eras: &[String]) -> Result<Self> {
        Self::load_with_paths(FragmentPaths::discover(), Registry::new(), active_eras)
    }

    /// Load fragments into an existing registry (e.g. one pre-seeded with the
    /// built-in fragments).
    pub fn load_with_paths(
        paths: FragmentPaths,
        mut registry: Registry,
        active_eras: &[String],
    ) -> Result<Self> {
        // Era activation: CLI flags win, PSET_ACTIVE_ERAS is the fallback.
        if active_eras.is_empty() {
            if let Ok(eras) = std::env::var("PSET_ACTIVE_ERAS") {
                registry.activate_eras(
                    eras.split(',').map(str::trim).filter(|e| !e.is_empty()),
                );
            }
        } else {
            registry.activate_eras(active_eras.iter().cloned());
        }

        let mut loaded_files = Vec::new();
        match paths.effective_dir() {
            Some(dir) => {
                for path in fragment_files(dir)? {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading fragment {}", path.display()))?;
                    let fragment = Fragment::from_yaml(&content)
                        .with_context(|| format!("parsing fragment {}", path.display()))?;
                    fragment
                        .install(&mut registry)
                        .with_context(|| format!("installing fragment {}", path.display()))?;
                    debug!(file = %path.display(), "installed fragment");
                    loaded_files.push(path);
                }
                info!(
                    dir = %dir.display(),
                    files = loaded_files.len(),
                    modules = registry.module_count(),
                    "loaded configuration fragments"
                );
            }
            None => {
                warn!("no fragments directory found, using built-in modules only");
            }
        }

        Ok(Self {
            paths,
            registry,
            loaded_files,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Consume the loader and return the registry.
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Fragment files that were read, in application order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    /// The directory fragments were read from, if any existed.
    pub fn fragments_dir(&self) -> Option<&Path> {
        self.paths.effective_dir()
    }
}

/// YAML fragment files in `dir`, sorted by file name.
fn fragment_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing fragments in {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_from_yaml_defaults() {
        let fragment = Fragment::from_yaml(
            r#"
modules:
  triggerEffTest:
    diagnosticPrescale: 1
    runOnline: false
    hwSources: [TM, DDU]
"#,
        )
        .unwrap();
        let mut registry = Registry::new();
        fragment.install(&mut registry).unwrap();
        let pset = registry.resolve("triggerEffTest").unwrap();
        assert_eq!(pset.get("hwSources"), Some(&Value::strings(["TM", "DDU"])));
        assert_eq!(pset.get("runOnline"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_fragment_modifier_registration_order() {
        let fragment = Fragment::from_yaml(
            r#"
modules:
  m:
    opt: 0
modifiers:
  - era: e1
    patches:
      - { module: m, option: opt, value: 1 }
  - era: e2
    patches:
      - { module: m, option: opt, value: 2 }
"#,
        )
        .unwrap();
        let mut registry = Registry::new();
        registry.activate_eras(["e1", "e2"]);
        fragment.install(&mut registry).unwrap();
        let resolved = registry.freeze().unwrap();
        assert_eq!(
            resolved.get("m").unwrap().get("opt"),
            Some(&Value::Int32(2))
        );
    }

    #[test]
    fn test_fragment_clone_with_nested_override() {
        let fragment = Fragment::from_yaml(
            r#"
modules:
  base:
    useRegression: true
    regressionConfig:
      isHLT: false
      regressionKeyEB: pfscecal_EBCorrection_offline
clones:
  - name: hlt
    from: base
    overrides:
      regressionConfig:
        isHLT: true
        regressionKeyEB: pfscecal_EBCorrection_online
"#,
        )
        .unwrap();
        let mut registry = Registry::new();
        fragment.install(&mut registry).unwrap();
        let hlt = registry.resolve("hlt").unwrap();
        assert_eq!(
            hlt.get_path("regressionConfig.regressionKeyEB")
                .and_then(Value::as_str),
            Some("pfscecal_EBCorrection_online")
        );
        let base = registry.resolve("base").unwrap();
        assert_eq!(
            base.get_path("regressionConfig.isHLT").and_then(Value::as_bool),
            Some(false)
        );
    }

    #[test]
    fn test_fragment_bad_yaml_is_parse_error() {
        let err = Fragment::from_yaml("modules: [not, a, map]").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ParseError);
    }
}
