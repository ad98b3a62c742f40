//! Configuration for the conformance harness
//!
//! These types replace ambient globals with explicit configuration.
//! Build them programmatically - no config files needed.
//!
//! # Example
//!
//! ```
//! use snapcheck::config::{PollTiming, StorageOperator};
//!
//! let timing = PollTiming::default();          // 300s total, polled every 15s
//! let slow = PollTiming::long();               // 15 minutes for slow rollouts
//!
//! let target = StorageOperator::default()
//!     .namespace("openshift-cluster-storage-operator");
//! ```

use std::time::Duration;

/// Total wait applied when no override is given: 300 seconds.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Number of polls spread over a wait window; interval = total / iterations.
pub const DEFAULT_ITERATIONS: u32 = 20;

/// Serving-cert expiry annotation keys stripped by the secret-disruption
/// scenarios.
pub const EXPIRY_ANNOTATIONS: [&str; 2] = [
    "service.alpha.openshift.io/expiry",
    "service.beta.openshift.io/expiry",
];

/// Timing for a polling loop: total wait and iteration count
///
/// The poll interval is always `max_wait / iterations`, so longer waits
/// poll proportionally less often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTiming {
    /// Total time to wait before giving up
    pub max_wait: Duration,

    /// Number of predicate evaluations spread over `max_wait`
    pub iterations: u32,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PollTiming {
    /// 15 minute wait for workloads known to converge slowly
    pub fn long() -> Self {
        Self::default().max_wait(Duration::from_secs(15 * 60))
    }

    /// 30 minute wait
    pub fn longer() -> Self {
        Self::default().max_wait(Duration::from_secs(30 * 60))
    }

    /// 60 minute wait, for full cluster-scale rollouts
    pub fn longest() -> Self {
        Self::default().max_wait(Duration::from_secs(60 * 60))
    }

    /// Set the total wait
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Set the iteration count
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Fixed sleep between polls
    pub fn interval(&self) -> Duration {
        self.max_wait / self.iterations.max(1)
    }
}

/// Identity of the storage operator under test
///
/// Defaults match the cluster CSI snapshot controller operator as deployed
/// on OpenShift; every field can be overridden for other layouts.
#[derive(Debug, Clone)]
pub struct StorageOperator {
    /// Namespace the operator manages its workloads in
    pub namespace: String,

    /// Snapshot controller Deployment name
    pub controller_deployment: String,

    /// Name of the controller container inside its pod template
    pub controller_container: String,

    /// Snapshot webhook Deployment name
    pub webhook_deployment: String,

    /// Name of the webhook container inside its pod template
    pub webhook_container: String,

    /// Serving-cert secret backing the webhook
    pub webhook_secret: String,

    /// ClusterOperator resource aggregating the subsystem's health
    pub cluster_operator: String,
}

impl Default for StorageOperator {
    fn default() -> Self {
        Self {
            namespace: "openshift-cluster-storage-operator".to_string(),
            controller_deployment: "csi-snapshot-controller".to_string(),
            controller_container: "snapshot-controller".to_string(),
            webhook_deployment: "csi-snapshot-webhook".to_string(),
            webhook_container: "webhook".to_string(),
            webhook_secret: "csi-snapshot-webhook-secret".to_string(),
            cluster_operator: "storage".to_string(),
        }
    }
}

impl StorageOperator {
    /// Set the operator namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the controller Deployment name
    pub fn controller_deployment(mut self, name: impl Into<String>) -> Self {
        self.controller_deployment = name.into();
        self
    }

    /// Set the controller container name
    pub fn controller_container(mut self, name: impl Into<String>) -> Self {
        self.controller_container = name.into();
        self
    }

    /// Set the webhook Deployment name
    pub fn webhook_deployment(mut self, name: impl Into<String>) -> Self {
        self.webhook_deployment = name.into();
        self
    }

    /// Set the webhook container name
    pub fn webhook_container(mut self, name: impl Into<String>) -> Self {
        self.webhook_container = name.into();
        self
    }

    /// Set the webhook secret name
    pub fn webhook_secret(mut self, name: impl Into<String>) -> Self {
        self.webhook_secret = name.into();
        self
    }

    /// Set the ClusterOperator name
    pub fn cluster_operator(mut self, name: impl Into<String>) -> Self {
        self.cluster_operator = name.into();
        self
    }
}
