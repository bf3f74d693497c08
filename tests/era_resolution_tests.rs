//! Integration tests combining the built-in fragments with fragment files.

use pset_config::config::{FragmentLoader, FragmentPaths, Registry, builtin};
use pset_config::value::Value;
use std::fs;
use tempfile::TempDir;

fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    builtin::install(&mut registry).unwrap();
    registry
}

fn load(dir: &TempDir, registry: Registry, eras: &[&str]) -> anyhow::Result<Registry> {
    let eras: Vec<String> = eras.iter().map(|e| e.to_string()).collect();
    Ok(
        FragmentLoader::load_with_paths(FragmentPaths::with_dir(dir.path()), registry, &eras)?
            .into_registry(),
    )
}

#[test]
fn test_fragment_modifier_patches_builtin_module() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("site.yaml"),
        r#"
modifiers:
  - era: run3_common
    patches:
      - { module: triggerEffTest, option: detailedAnalysis, value: true }
"#,
    )
    .unwrap();

    let resolved = load(&temp, builtin_registry(), &["run3_common"])
        .unwrap()
        .freeze()
        .unwrap();
    let pset = resolved.get("triggerEffTest").unwrap();
    assert_eq!(pset.get("detailedAnalysis"), Some(&Value::Bool(true)));
    // Built-in run2 modifiers stay dormant.
    assert_eq!(pset.get("hwSources"), Some(&Value::strings(["TM", "DDU"])));
}

#[test]
fn test_fragment_clones_builtin_module() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("online.yaml"),
        r#"
clones:
  - name: triggerEffTestOnline
    from: triggerEffTest
    overrides:
      runOnline: true
"#,
    )
    .unwrap();

    let resolved = load(&temp, builtin_registry(), &["run2_common"])
        .unwrap()
        .freeze()
        .unwrap();
    let online = resolved.get("triggerEffTestOnline").unwrap();
    assert_eq!(online.get("runOnline"), Some(&Value::Bool(true)));
    // The clone copied defaults before the era pass, and no modifier names
    // it, so it keeps the two-source default.
    assert_eq!(online.get("hwSources"), Some(&Value::strings(["TM", "DDU"])));
    // The source itself was patched by the active era.
    assert_eq!(
        resolved.get("triggerEffTest").unwrap().get("hwSources"),
        Some(&Value::strings(["TM"]))
    );
}

#[test]
fn test_fragment_cannot_redefine_builtin_module() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("clash.yaml"),
        "modules:\n  triggerEffTest:\n    diagnosticPrescale: 2\n",
    )
    .unwrap();

    let err = load(&temp, builtin_registry(), &[]).unwrap_err();
    assert!(format!("{:#}", err).contains("Module already defined: triggerEffTest"));
}

#[test]
fn test_simultaneous_eras_last_registered_wins() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("prescale.yaml"),
        r#"
modifiers:
  - era: run2_HI_specific
    patches:
      - { module: triggerEffTest, option: diagnosticPrescale, value: 5 }
  - era: pA_2016
    patches:
      - { module: triggerEffTest, option: diagnosticPrescale, value: 9 }
"#,
    )
    .unwrap();

    let resolved = load(
        &temp,
        builtin_registry(),
        &["run2_HI_specific", "pA_2016"],
    )
    .unwrap()
    .freeze()
    .unwrap();
    assert_eq!(
        resolved.get("triggerEffTest").unwrap().get("diagnosticPrescale"),
        Some(&Value::Int32(9))
    );
}

#[test]
fn test_resolved_snapshot_serializes_deterministically() {
    let resolved = builtin_registry().freeze().unwrap();
    let a = serde_yaml::to_string(&resolved).unwrap();
    let b = serde_yaml::to_string(&builtin_registry().freeze().unwrap()).unwrap();
    assert_eq!(a, b);
    assert!(a.contains("pfscecal_EBCorrection_online"));
}
