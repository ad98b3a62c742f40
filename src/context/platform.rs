//! Platform gates
//!
//! Scenarios skip on clusters where the subsystem under test is absent:
//! the CSISnapshot capability can be disabled at install time, external
//! control-plane topologies run the snapshot controllers on a
//! management cluster, and VolumeGroupSnapshot is gated behind the
//! TechPreviewNoUpgrade feature set.

use super::{Context, ContextError, Gvr};

/// Control-plane topology whose snapshot controllers live off-cluster
pub const EXTERNAL_TOPOLOGY: &str = "External";

impl Context {
    /// Whether a named cluster capability is enabled
    ///
    /// Reads `clusterversions/version` enabled capabilities.
    pub async fn capability_enabled(&self, capability: &str) -> Result<bool, ContextError> {
        let version = self
            .get_dynamic_cluster(&Gvr::cluster_version(), "version")
            .await?;

        let enabled = version["status"]["capabilities"]["enabledCapabilities"]
            .as_array()
            .is_some_and(|caps| caps.iter().any(|c| c.as_str() == Some(capability)));

        Ok(enabled)
    }

    /// The cluster's control-plane topology
    ///
    /// Reads `infrastructures/cluster`; an absent field resolves to an
    /// empty string.
    pub async fn control_plane_topology(&self) -> Result<String, ContextError> {
        let infrastructure = self
            .get_dynamic_cluster(&Gvr::infrastructure(), "cluster")
            .await?;

        Ok(infrastructure["status"]["controlPlaneTopology"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Whether the TechPreviewNoUpgrade feature set is active
    pub async fn tech_preview_enabled(&self) -> Result<bool, ContextError> {
        let feature_gate = self
            .get_dynamic_cluster(&Gvr::feature_gate(), "cluster")
            .await?;

        Ok(feature_gate["spec"]["featureSet"].as_str() == Some("TechPreviewNoUpgrade"))
    }
}
