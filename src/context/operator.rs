//! ClusterOperator health checks
//!
//! A storage subsystem disruption must fully settle before the next
//! scenario starts, so each disruptive scenario ends by waiting for the
//! storage ClusterOperator to report healthy again.
//!
//! Error policy is explicit and uniform: direct checks propagate fetch
//! errors to the caller; the polled wait logs them and keeps polling,
//! because inside a poll a transient fetch failure is indistinguishable
//! from "not converged yet".

use tracing::debug;

use super::{Context, ContextError, Gvr};
use crate::config::PollTiming;
use crate::eventually::eventually;

/// One entry of a ClusterOperator's `status.conditions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorCondition {
    /// Condition type (Available, Upgradeable, Degraded, Progressing, ...)
    pub type_: String,
    /// Condition status ("True", "False", "Unknown")
    pub status: String,
}

/// Healthy iff Available=True, Upgradeable=True, Degraded=False and
/// Progressing=False
///
/// A missing condition is a mismatch: an operator that does not report
/// all four is not considered settled.
pub fn conditions_healthy(conditions: &[OperatorCondition]) -> bool {
    condition_status(conditions, "Available") == Some("True")
        && condition_status(conditions, "Upgradeable") == Some("True")
        && condition_status(conditions, "Degraded") == Some("False")
        && condition_status(conditions, "Progressing") == Some("False")
}

fn condition_status<'a>(conditions: &'a [OperatorCondition], type_: &str) -> Option<&'a str> {
    conditions
        .iter()
        .find(|c| c.type_ == type_)
        .map(|c| c.status.as_str())
}

impl Context {
    /// Fetch the named ClusterOperator's status conditions
    pub async fn cluster_operator_conditions(
        &self,
        name: &str,
    ) -> Result<Vec<OperatorCondition>, ContextError> {
        let operator = self
            .get_dynamic_cluster(&Gvr::cluster_operator(), name)
            .await?;

        let conditions = operator["status"]["conditions"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|c| {
                        Some(OperatorCondition {
                            type_: c["type"].as_str()?.to_string(),
                            status: c["status"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(conditions)
    }

    /// Check whether the named ClusterOperator is healthy
    ///
    /// Fetch errors propagate: a direct health assertion should fail
    /// fast rather than report "unhealthy" for an unreachable API.
    pub async fn cluster_operator_healthy(&self, name: &str) -> Result<bool, ContextError> {
        let conditions = self.cluster_operator_conditions(name).await?;
        Ok(conditions_healthy(&conditions))
    }

    /// Wait for the named ClusterOperator to settle back to healthy
    ///
    /// The teardown guard between disruptive scenarios. Fetch errors
    /// inside the poll are logged and treated as not-yet-healthy.
    pub async fn wait_cluster_operator_settled(
        &self,
        name: &str,
        timing: &PollTiming,
    ) -> Result<(), ContextError> {
        eventually(|| async {
            match self.cluster_operator_healthy(name).await {
                Ok(healthy) => healthy,
                Err(e) => {
                    debug!(operator = %name, error = %e, "ClusterOperator fetch failed, retrying");
                    false
                }
            }
        })
        .describe(format!("clusteroperator/{name} healthy"))
        .timeout(timing.max_wait)
        .interval(timing.interval())
        .await_condition()
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(type_: &str, status: &str) -> OperatorCondition {
        OperatorCondition {
            type_: type_.to_string(),
            status: status.to_string(),
        }
    }

    fn settled() -> Vec<OperatorCondition> {
        vec![
            cond("Available", "True"),
            cond("Upgradeable", "True"),
            cond("Degraded", "False"),
            cond("Progressing", "False"),
        ]
    }

    #[test]
    fn test_healthy_when_all_conditions_match() {
        assert!(conditions_healthy(&settled()));
    }

    #[test]
    fn test_any_single_mismatch_is_unhealthy() {
        for (type_, bad) in [
            ("Available", "False"),
            ("Upgradeable", "False"),
            ("Degraded", "True"),
            ("Progressing", "True"),
        ] {
            let mut conditions = settled();
            if let Some(c) = conditions.iter_mut().find(|c| c.type_ == type_) {
                c.status = bad.to_string();
            }
            assert!(
                !conditions_healthy(&conditions),
                "{type_}={bad} should be unhealthy"
            );
        }
    }

    #[test]
    fn test_missing_condition_is_unhealthy() {
        let mut conditions = settled();
        conditions.retain(|c| c.type_ != "Upgradeable");
        assert!(!conditions_healthy(&conditions));
    }

    #[test]
    fn test_unknown_status_is_unhealthy() {
        let mut conditions = settled();
        conditions[0].status = "Unknown".to_string();
        assert!(!conditions_healthy(&conditions));
    }

    #[test]
    fn test_extra_conditions_are_ignored() {
        let mut conditions = settled();
        conditions.push(cond("EvaluationConditionsDetected", "False"));
        assert!(conditions_healthy(&conditions));
    }
}
