//! Rich wait errors with debugging context
//!
//! When a poll gives up, the error should say what was being waited on
//! and what the resource looked like at the last observation.

use std::fmt;
use std::time::Duration;

/// Error context for a wait that timed out
#[derive(Debug, Clone)]
pub struct WaitError {
    /// Resource reference (e.g., "deployment/csi-snapshot-webhook")
    pub resource: String,
    /// Description of the last observed state
    pub last_state: String,
    /// How long we waited before giving up
    pub elapsed: Duration,
    /// The timeout that was configured
    pub timeout: Duration,
}

impl WaitError {
    /// Create a new WaitError
    pub fn new(resource: impl Into<String>, timeout: Duration, elapsed: Duration) -> Self {
        Self {
            resource: resource.into(),
            last_state: "unknown".to_string(),
            elapsed,
            timeout,
        }
    }

    /// Set the last observed state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.last_state = state.into();
        self
    }
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Wait timeout for {}", self.resource)?;
        writeln!(f, "├─ Last state: {}", self.last_state)?;
        writeln!(f, "├─ Elapsed: {:?}", self.elapsed)?;
        write!(f, "└─ Timeout: {:?}", self.timeout)
    }
}

impl std::error::Error for WaitError {}

/// Helper trait for extracting a state description from K8s resources
pub trait ResourceState {
    /// Get a human-readable description of the resource's current state
    fn state_description(&self) -> String;
}

impl ResourceState for k8s_openapi::api::apps::v1::Deployment {
    fn state_description(&self) -> String {
        let desired = self.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
        let available = self
            .status
            .as_ref()
            .and_then(|s| s.available_replicas)
            .unwrap_or(0);
        let unavailable = self
            .status
            .as_ref()
            .and_then(|s| s.unavailable_replicas)
            .unwrap_or(0);

        if unavailable > 0 {
            format!(
                "{}/{} available, {} unavailable",
                available, desired, unavailable
            )
        } else {
            format!("{}/{} available", available, desired)
        }
    }
}

impl ResourceState for k8s_openapi::api::core::v1::Pod {
    fn state_description(&self) -> String {
        let phase = self
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .unwrap_or("Unknown");

        match self
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref())
        {
            Some(statuses) => {
                let ready = statuses.iter().filter(|c| c.ready).count();
                let waiting: Vec<&str> = statuses
                    .iter()
                    .filter_map(|c| {
                        c.state
                            .as_ref()
                            .and_then(|s| s.waiting.as_ref())
                            .and_then(|w| w.reason.as_deref())
                    })
                    .collect();

                if waiting.is_empty() {
                    format!("phase={}, containers {}/{} ready", phase, ready, statuses.len())
                } else {
                    format!(
                        "phase={}, containers {}/{} ready, waiting: {}",
                        phase,
                        ready,
                        statuses.len(),
                        waiting.join(", ")
                    )
                }
            }
            None => format!("phase={}, no container status", phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_error_display() {
        let err = WaitError::new(
            "deployment/csi-snapshot-webhook",
            Duration::from_secs(300),
            Duration::from_secs(300),
        )
        .with_state("1/2 available, 1 unavailable");

        let output = err.to_string();
        assert!(output.contains("deployment/csi-snapshot-webhook"));
        assert!(output.contains("1/2 available"));
        assert!(output.contains("300s"));
    }

    #[test]
    fn test_wait_error_builder() {
        let err = WaitError::new(
            "deployment/test",
            Duration::from_secs(120),
            Duration::from_secs(115),
        );

        assert_eq!(err.resource, "deployment/test");
        assert_eq!(err.timeout, Duration::from_secs(120));
        assert_eq!(err.elapsed, Duration::from_secs(115));
        assert_eq!(err.last_state, "unknown");
    }

    #[test]
    fn test_deployment_state_description() {
        use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStatus};

        let deployment = Deployment {
            spec: Some(DeploymentSpec {
                replicas: Some(2),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                available_replicas: Some(1),
                unavailable_replicas: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };

        let state = deployment.state_description();
        assert!(state.contains("1/2 available"));
        assert!(state.contains("1 unavailable"));
    }

    #[test]
    fn test_pod_state_description() {
        use k8s_openapi::api::core::v1::{
            ContainerState, ContainerStateWaiting, ContainerStatus, Pod, PodStatus,
        };

        let pod = Pod {
            status: Some(PodStatus {
                phase: Some("Pending".to_string()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "webhook".to_string(),
                    ready: false,
                    state: Some(ContainerState {
                        waiting: Some(ContainerStateWaiting {
                            reason: Some("ContainerCreating".to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let state = pod.state_description();
        assert!(state.contains("phase=Pending"));
        assert!(state.contains("0/1 ready"));
        assert!(state.contains("ContainerCreating"));
    }
}
