use super::{Context, ContextError};
use kube::api::{Api, DynamicObject};

/// `GroupVersionResource` identifies a Kubernetes resource type
///
/// Used with the dynamic client for platform custom resources the
/// harness reads but has no typed structs for (ClusterOperator,
/// ClusterVersion, Infrastructure, FeatureGate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gvr {
    /// API group (e.g., "config.openshift.io", "" for core)
    pub group: String,
    /// API version (e.g., "v1", "v1beta1")
    pub version: String,
    /// Resource name (plural, e.g., "clusteroperators")
    pub resource: String,
    /// Kind name (singular, e.g., "`ClusterOperator`")
    pub kind: String,
}

impl Gvr {
    /// Create a new `GroupVersionResource`
    #[must_use]
    pub fn new(group: &str, version: &str, resource: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Platform config: `ClusterOperator`
    #[must_use]
    pub fn cluster_operator() -> Self {
        Self::new(
            "config.openshift.io",
            "v1",
            "clusteroperators",
            "ClusterOperator",
        )
    }

    /// Platform config: `ClusterVersion`
    #[must_use]
    pub fn cluster_version() -> Self {
        Self::new(
            "config.openshift.io",
            "v1",
            "clusterversions",
            "ClusterVersion",
        )
    }

    /// Platform config: Infrastructure
    #[must_use]
    pub fn infrastructure() -> Self {
        Self::new(
            "config.openshift.io",
            "v1",
            "infrastructures",
            "Infrastructure",
        )
    }

    /// Platform config: `FeatureGate`
    #[must_use]
    pub fn feature_gate() -> Self {
        Self::new("config.openshift.io", "v1", "featuregates", "FeatureGate")
    }

    /// Convert to kube `ApiResource`
    pub(crate) fn to_api_resource(&self) -> kube::core::ApiResource {
        kube::core::ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: if self.group.is_empty() {
                self.version.clone()
            } else {
                format!("{}/{}", self.group, self.version)
            },
            kind: self.kind.clone(),
            plural: self.resource.clone(),
        }
    }
}

impl Context {
    /// Get a cluster-scoped unstructured resource as JSON
    ///
    /// # Example
    ///
    /// ```ignore
    /// let co = ctx.get_dynamic_cluster(&Gvr::cluster_operator(), "storage").await?;
    /// println!("conditions: {:?}", co["status"]["conditions"]);
    /// ```
    pub async fn get_dynamic_cluster(
        &self,
        gvr: &Gvr,
        name: &str,
    ) -> Result<serde_json::Value, ContextError> {
        let ar = gvr.to_api_resource();
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);

        let obj = api.get(name).await.map_err(|e| {
            ContextError::GetError(format!("{} '{}': {}", gvr.kind, name, e))
        })?;

        serde_json::to_value(obj)
            .map_err(|e| ContextError::GetError(format!("failed to serialize {name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gvr_api_version() {
        let gvr = Gvr::cluster_operator();
        let ar = gvr.to_api_resource();
        assert_eq!(ar.api_version, "config.openshift.io/v1");
        assert_eq!(ar.plural, "clusteroperators");
        assert_eq!(ar.kind, "ClusterOperator");
    }

    #[test]
    fn test_gvr_core_group() {
        let gvr = Gvr::new("", "v1", "pods", "Pod");
        assert_eq!(gvr.to_api_resource().api_version, "v1");
    }
}
