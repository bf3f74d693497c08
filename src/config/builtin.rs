//! Built-in configuration fragments.
//!
//! Default module definitions shipped with the binary, installed before any
//! fragment files are read. Covers the DT trigger-efficiency test client and
//! the ECAL "Mustache" super-cluster producer with its HLT clone.

use crate::config::modifier::EraModifier;
use crate::config::pset::Pset;
use crate::config::registry::Registry;
use crate::error::ConfigResult;
use crate::value::{InputTag, Value};

/// DT trigger-efficiency test client.
///
/// Every run2-family era narrows the hardware sources to the twin-mux
/// readout only; the legacy default also reads out the DDU path.
pub fn trigger_eff_test(registry: &mut Registry) -> ConfigResult<()> {
    let defaults = Pset::new()
        // prescale factor (in luminosity blocks) for the client analysis
        .with("diagnosticPrescale", 1)
        .with("runOnline", false)
        .with("hwSources", Value::strings(["TM", "DDU"]))
        // false when the local-trigger task ran on LTC digis
        .with("localrun", true)
        .with("folderRoot", "")
        .with("detailedAnalysis", false);
    registry.define("triggerEffTest", defaults)?;

    for era in ["run2_common", "run2_25ns_specific", "run2_HI_specific", "pA_2016"] {
        registry.register_modifier(
            EraModifier::new(era).modify("triggerEffTest", "hwSources", Value::strings(["TM"])),
        );
    }
    Ok(())
}

/// ECAL "Mustache" super-cluster producer and its HLT clone.
///
/// The HLT clone replaces the nested regression sub-config wholesale,
/// switching to the online correction keys and dropping the offline vertex
/// collection.
pub fn particle_flow_super_cluster(registry: &mut Registry) -> ConfigResult<()> {
    let regression = Pset::new()
        .with("isHLT", false)
        .with("eRecHitThreshold", 0.95)
        .with("regressionKeyEB", "pfscecal_EBCorrection_offline")
        .with("uncertaintyKeyEB", "pfscecal_EBUncertainty_offline")
        .with("regressionKeyEE", "pfscecal_EECorrection_offline")
        .with("uncertaintyKeyEE", "pfscecal_EEUncertainty_offline")
        .with("vertexCollection", InputTag::new("offlinePrimaryVertices"));

    // HLT regression setup: value-copy the sub-config with online keys.
    let hlt_regression = regression.clone_with(
        "particleFlowSuperClusterECALHLT",
        [
            ("isHLT".to_string(), Value::Bool(true)),
            ("eRecHitThreshold".to_string(), Value::Double(1.0)),
            (
                "regressionKeyEB".to_string(),
                Value::from("pfscecal_EBCorrection_online"),
            ),
            (
                "uncertaintyKeyEB".to_string(),
                Value::from("pfscecal_EBUncertainty_online"),
            ),
            (
                "regressionKeyEE".to_string(),
                Value::from("pfscecal_EECorrection_online"),
            ),
            (
                "uncertaintyKeyEE".to_string(),
                Value::from("pfscecal_EEUncertainty_online"),
            ),
            (
                "vertexCollection".to_string(),
                Value::InputTag(InputTag::empty()),
            ),
        ],
    )?;

    let defaults = Pset::new()
        .with("clusteringType", "Mustache")
        .with("energyWeight", "Raw")
        .with("useRegression", true)
        .with("seedThresholdIsET", true)
        .with("thresh_SCEt", 4.0)
        .with("PFClusters", InputTag::new("particleFlowClusterECAL"))
        .with("regressionConfig", regression);
    registry.define("particleFlowSuperClusterECALMustache", defaults)?;

    registry.clone_module(
        "particleFlowSuperClusterECALMustache",
        "particleFlowSuperClusterECALHLT",
        [("regressionConfig".to_string(), Value::Pset(hlt_regression))],
    )?;
    Ok(())
}

/// Install every built-in fragment.
pub fn install(registry: &mut Registry) -> ConfigResult<()> {
    trigger_eff_test(registry)?;
    particle_flow_super_cluster(registry)?;
    Ok(())
}
