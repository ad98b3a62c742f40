//! Workload descriptor for Deployments under test
//!
//! A `Workload` names a Deployment and what the harness expects of it:
//! replica count, pod selector, readiness window. Scenarios build one
//! per test run with collision-resistant defaults, override the fields
//! they care about, and drive the live resource through it.
//!
//! # Example
//!
//! ```ignore
//! use snapcheck::Workload;
//!
//! let mut webhook = Workload::new()
//!     .name("csi-snapshot-webhook")
//!     .namespace("openshift-cluster-storage-operator")
//!     .replicas("2");
//!
//! webhook.restart(&ctx).await?;          // rolling restart, waits for readiness
//! let pods = webhook.ready_pod_names(&ctx).await?;
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams};
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{PollTiming, DEFAULT_ITERATIONS, DEFAULT_MAX_WAIT};
use crate::context::{field_path, render_field, Context, ContextError};
use crate::wait::{ResourceState, WaitError};

const RESOURCE_VERSION: &str = "{.metadata.resourceVersion}";

/// A named, namespaced Deployment and the expectations held against it
#[derive(Debug, Clone)]
pub struct Workload {
    /// Deployment name
    pub name: String,
    /// Namespace; empty means the context's namespace
    pub namespace: String,
    /// Desired replica count, string-encoded
    pub replicas: String,
    /// Pod label selector in `key=value` form
    pub app_label: String,
    /// Container mount path for attached volumes
    pub mount_path: String,
    /// Associated PVC name, if any
    pub pvc_name: String,
    /// Volume attachment style in the pod template
    pub volume_type: String,
    /// Where the volume type is applied in the template
    pub type_path: String,
    /// Maximum wait for readiness
    pub max_wait_ready: Duration,
}

impl Default for Workload {
    fn default() -> Self {
        Self::new()
    }
}

impl Workload {
    /// New descriptor with computed defaults
    ///
    /// The name gets a fresh random suffix each call so parallel test
    /// runs never collide, and the default label selector matches it.
    pub fn new() -> Self {
        let name = format!("e2e-{}", &Uuid::new_v4().to_string()[..8]);
        Self {
            app_label: format!("app={name}"),
            name,
            namespace: String::new(),
            replicas: "1".to_string(),
            mount_path: "/mnt/storage".to_string(),
            pvc_name: String::new(),
            volume_type: "volumeMounts".to_string(),
            type_path: "mountPath".to_string(),
            max_wait_ready: DEFAULT_MAX_WAIT,
        }
    }

    /// Set the Deployment name (the label selector is not re-derived)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the desired replica count
    pub fn replicas(mut self, replicas: impl Into<String>) -> Self {
        self.replicas = replicas.into();
        self
    }

    /// Set the pod label selector
    pub fn app_label(mut self, app_label: impl Into<String>) -> Self {
        self.app_label = app_label.into();
        self
    }

    /// Set the volume mount path
    pub fn mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    /// Set the PVC name
    pub fn pvc_name(mut self, pvc_name: impl Into<String>) -> Self {
        self.pvc_name = pvc_name.into();
        self
    }

    /// Set the volume attachment style
    pub fn volume_type(mut self, volume_type: impl Into<String>) -> Self {
        self.volume_type = volume_type.into();
        self
    }

    /// Set the volume type path
    pub fn type_path(mut self, type_path: impl Into<String>) -> Self {
        self.type_path = type_path.into();
        self
    }

    /// Set the readiness wait
    pub fn max_wait_ready(mut self, max_wait_ready: Duration) -> Self {
        self.max_wait_ready = max_wait_ready;
        self
    }

    /// Copy with the 15 minute readiness window, original unmodified
    pub fn long_wait(&self) -> Self {
        self.clone().max_wait_ready(PollTiming::long().max_wait)
    }

    /// Copy with a specific readiness window, original unmodified
    pub fn with_wait_timeout(&self, max_wait_ready: Duration) -> Self {
        self.clone().max_wait_ready(max_wait_ready)
    }

    /// Label selector, normalized to `app=<value>` when no key was given
    pub fn selector(&self) -> String {
        if self.app_label.contains('=') {
            self.app_label.clone()
        } else {
            format!("app={}", self.app_label)
        }
    }

    fn poll_interval(&self) -> Duration {
        self.max_wait_ready / DEFAULT_ITERATIONS
    }

    fn namespace_or<'a>(&'a self, ctx: &'a Context) -> &'a str {
        if self.namespace.is_empty() {
            &ctx.namespace
        } else {
            &self.namespace
        }
    }

    fn api(&self, ctx: &Context) -> Api<Deployment> {
        Api::namespaced(ctx.client.clone(), self.namespace_or(ctx))
    }

    fn pods(&self, ctx: &Context) -> Api<Pod> {
        Api::namespaced(ctx.client.clone(), self.namespace_or(ctx))
    }

    async fn fetch(&self, ctx: &Context) -> Result<Deployment, ContextError> {
        self.api(ctx).get(&self.name).await.map_err(|e| {
            ContextError::GetError(crate::context::improve_error_message(
                &e,
                "Deployment",
                &self.name,
            ))
        })
    }

    async fn fetch_json(&self, ctx: &Context) -> Result<Value, ContextError> {
        let deployment = self.fetch(ctx).await?;
        serde_json::to_value(deployment)
            .map_err(|e| ContextError::GetError(format!("failed to serialize {}: {e}", self.name)))
    }

    /// Fetch a single field of the live Deployment by path expression
    ///
    /// A missing field renders as the empty string, like a jsonpath
    /// query would print it.
    pub async fn field(&self, ctx: &Context, path: &str) -> Result<String, ContextError> {
        let value = self.fetch_json(ctx).await?;
        let rendered = render_field(field_path(&value, path));
        debug!(
            deployment = %self.name,
            path = %path,
            value = %rendered,
            "Fetched field"
        );
        Ok(rendered)
    }

    /// Read the live desired replica count
    pub async fn live_replicas(&self, ctx: &Context) -> Result<String, ContextError> {
        self.field(ctx, "{.spec.replicas}").await
    }

    /// Scale the live Deployment and record the new count on success
    pub async fn scale(&mut self, ctx: &Context, replicas: &str) -> Result<(), ContextError> {
        let count = parse_replicas(replicas)?;

        let patch = serde_json::json!({ "spec": { "replicas": count } });
        self.api(ctx)
            .patch(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| {
                ContextError::PatchError(crate::context::improve_error_message(
                    &e,
                    "Deployment",
                    &self.name,
                ))
            })?;

        self.replicas = replicas.to_string();

        info!(
            deployment = %self.name,
            replicas = %replicas,
            "Scaled deployment"
        );

        Ok(())
    }

    /// Pod-template annotations of the live Deployment
    ///
    /// The pre/post snapshot for disruption scenarios: the operator
    /// rotates the template annotations when its serving cert changes.
    pub async fn template_annotations(
        &self,
        ctx: &Context,
    ) -> Result<BTreeMap<String, String>, ContextError> {
        let deployment = self.fetch(ctx).await?;
        Ok(deployment
            .spec
            .and_then(|s| s.template.metadata)
            .and_then(|m| m.annotations)
            .unwrap_or_default())
    }

    /// Args of a named container in the live pod template
    pub async fn container_args(
        &self,
        ctx: &Context,
        container: &str,
    ) -> Result<Vec<String>, ContextError> {
        let deployment = self.fetch(ctx).await?;
        let spec = deployment
            .spec
            .and_then(|s| s.template.spec)
            .ok_or_else(|| {
                ContextError::GetError(format!("Deployment '{}' has no pod spec", self.name))
            })?;

        spec.containers
            .into_iter()
            .find(|c| c.name == container)
            .map(|c| c.args.unwrap_or_default())
            .ok_or_else(|| {
                ContextError::GetError(format!(
                    "container '{container}' not found in Deployment '{}'",
                    self.name
                ))
            })
    }

    /// List pod names once the Deployment's Running pods match the
    /// desired count
    ///
    /// Polls until the number of `Running` pods behind the label
    /// selector equals the desired replica count, then returns their
    /// names. A transient list failure is logged and retried.
    pub async fn ready_pod_names(&self, ctx: &Context) -> Result<Vec<String>, ContextError> {
        let params = ListParams::default().labels(&self.selector());
        let start = Instant::now();
        let interval = self.poll_interval();
        let mut last_state = "no pods observed".to_string();

        loop {
            match self.pods(ctx).list(&params).await {
                Ok(list) => {
                    let names: Vec<String> = list
                        .items
                        .iter()
                        .filter(|p| {
                            p.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running")
                        })
                        .filter_map(|p| p.metadata.name.clone())
                        .collect();

                    if names.len().to_string() == self.replicas {
                        debug!(
                            deployment = %self.name,
                            pods = ?names,
                            "Ready pod list collected"
                        );
                        return Ok(names);
                    }
                    last_state = format!("{}/{} pods running", names.len(), self.replicas);
                }
                Err(e) => {
                    debug!(
                        deployment = %self.name,
                        error = %e,
                        "Pod list failed, retrying"
                    );
                    last_state = format!("pod list failed: {e}");
                }
            }

            if start.elapsed() >= self.max_wait_ready {
                return Err(WaitError::new(
                    format!("pods of deployment/{}", self.name),
                    self.max_wait_ready,
                    start.elapsed(),
                )
                .with_state(last_state)
                .into());
            }

            sleep(interval).await;
        }
    }

    /// Rolling restart: annotate the pod template, confirm the control
    /// plane registered the restart, then wait for readiness
    ///
    /// The `resourceVersion` poll between the two phases avoids a race
    /// where readiness is checked before the rollout has started.
    pub async fn restart(&mut self, ctx: &Context) -> Result<(), ContextError> {
        let before = self.field(ctx, RESOURCE_VERSION).await?;

        let patch = serde_json::json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            "kubectl.kubernetes.io/restartedAt": chrono::Utc::now().to_rfc3339()
                        }
                    }
                }
            }
        });

        self.api(ctx)
            .patch(&self.name, &PatchParams::default(), &Patch::Strategic(&patch))
            .await
            .map_err(|e| {
                ContextError::PatchError(crate::context::improve_error_message(
                    &e,
                    "Deployment",
                    &self.name,
                ))
            })?;

        crate::eventually::eventually(|| async {
            match self.field(ctx, RESOURCE_VERSION).await {
                Ok(version) => version != before.as_str(),
                Err(e) => {
                    debug!(deployment = %self.name, error = %e, "resourceVersion fetch failed, retrying");
                    false
                }
            }
        })
        .describe(format!("deployment/{} resourceVersion updated", self.name))
        .timeout(DEFAULT_MAX_WAIT)
        .await_condition()
        .await?;

        self.wait_ready(ctx).await?;

        info!(
            deployment = %self.name,
            "Rolling restart complete"
        );

        Ok(())
    }

    /// Hard restart: delete all pods behind the selector, then wait for
    /// readiness
    pub async fn hard_restart(&mut self, ctx: &Context) -> Result<(), ContextError> {
        let params = ListParams::default().labels(&self.selector());
        self.pods(ctx)
            .delete_collection(&DeleteParams::default(), &params)
            .await
            .map_err(|e| {
                ContextError::DeleteError(format!(
                    "failed to delete pods of '{}': {e}",
                    self.name
                ))
            })?;

        info!(
            deployment = %self.name,
            selector = %self.selector(),
            "Deleted pods for hard restart"
        );

        self.wait_ready(ctx).await
    }

    /// Observe desired and available replica counts, refreshing the
    /// descriptor's desired count from the live resource
    async fn observe_replicas(&mut self, ctx: &Context) -> Result<(String, String), ContextError> {
        let value = self.fetch_json(ctx).await?;
        self.replicas = render_field(field_path(&value, "{.spec.replicas}"));
        let available = render_field(field_path(&value, "{.status.availableReplicas}"));
        Ok((self.replicas.clone(), available))
    }

    /// Whether the Deployment is ready: desired and available replica
    /// counts equal as strings
    ///
    /// The resource schema omits `availableReplicas` at zero, so an
    /// empty observation counts as ready when zero replicas are desired.
    pub async fn is_ready(&mut self, ctx: &Context) -> Result<bool, ContextError> {
        let (desired, available) = self.observe_replicas(ctx).await?;
        Ok(replicas_match(&desired, &available))
    }

    /// Wait for the Deployment to become ready
    ///
    /// Query errors inside the poll are logged and treated as
    /// not-yet-ready; only the deadline fails the wait.
    pub async fn wait_ready(&mut self, ctx: &Context) -> Result<(), ContextError> {
        let start = Instant::now();
        let interval = self.poll_interval();
        let mut last_state = "unknown".to_string();

        loop {
            match self.observe_replicas(ctx).await {
                Ok((desired, available)) => {
                    if replicas_match(&desired, &available) {
                        info!(
                            deployment = %self.name,
                            replicas = %desired,
                            "Deployment ready"
                        );
                        return Ok(());
                    }
                    let shown = if available.is_empty() { "0" } else { available.as_str() };
                    last_state = format!("{shown}/{desired} available");
                }
                Err(e) => {
                    debug!(
                        deployment = %self.name,
                        error = %e,
                        "Readiness check failed, retrying"
                    );
                    last_state = format!("readiness query failed: {e}");
                }
            }

            if start.elapsed() >= self.max_wait_ready {
                return Err(WaitError::new(
                    format!("deployment/{}", self.name),
                    self.max_wait_ready,
                    start.elapsed(),
                )
                .with_state(last_state)
                .into());
            }

            sleep(interval).await;
        }
    }

    /// Human-readable summary of the live Deployment
    pub async fn describe(&self, ctx: &Context) -> Result<String, ContextError> {
        let deployment = self.fetch(ctx).await?;
        let mut out = format!(
            "Deployment {}/{}\n",
            self.namespace_or(ctx),
            self.name
        );
        out.push_str(&format!("  State: {}\n", deployment.state_description()));

        if let Some(labels) = deployment.metadata.labels.as_ref() {
            for (key, value) in labels {
                out.push_str(&format!("  Label: {key}={value}\n"));
            }
        }

        let annotations = deployment
            .spec
            .and_then(|s| s.template.metadata)
            .and_then(|m| m.annotations)
            .unwrap_or_default();
        for (key, value) in &annotations {
            out.push_str(&format!("  Template annotation: {key}={value}\n"));
        }

        Ok(out)
    }
}

/// Validate a string-encoded replica count: a non-negative integer
fn parse_replicas(replicas: &str) -> Result<i64, ContextError> {
    match replicas.parse::<i64>() {
        Ok(count) if count >= 0 => Ok(count),
        _ => Err(ContextError::InvalidReplicas(replicas.to_string())),
    }
}

/// Desired and available counts match, with the empty observation
/// standing in for zero
fn replicas_match(desired: &str, available: &str) -> bool {
    let available = if desired == "0" && available.is_empty() {
        "0"
    } else {
        available
    };
    desired == available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let workload = Workload::new();

        assert!(workload.name.starts_with("e2e-"));
        assert_eq!(workload.name.len(), "e2e-".len() + 8);
        assert_eq!(workload.app_label, format!("app={}", workload.name));
        assert_eq!(workload.replicas, "1");
        assert_eq!(workload.namespace, "");
        assert_eq!(workload.mount_path, "/mnt/storage");
        assert_eq!(workload.pvc_name, "");
        assert_eq!(workload.volume_type, "volumeMounts");
        assert_eq!(workload.type_path, "mountPath");
        assert_eq!(workload.max_wait_ready, Duration::from_secs(300));
    }

    #[test]
    fn test_names_are_collision_resistant() {
        assert_ne!(Workload::new().name, Workload::new().name);
    }

    #[test]
    fn test_override_changes_only_that_field() {
        let workload = Workload::new().replicas("3");

        assert_eq!(workload.replicas, "3");
        assert!(workload.name.starts_with("e2e-"));
        assert_eq!(workload.mount_path, "/mnt/storage");
        assert_eq!(workload.max_wait_ready, Duration::from_secs(300));
    }

    #[test]
    fn test_last_write_wins() {
        let workload = Workload::new().replicas("2").replicas("5");
        assert_eq!(workload.replicas, "5");
    }

    #[test]
    fn test_name_override_keeps_label() {
        let workload = Workload::new().name("csi-snapshot-webhook");

        assert_eq!(workload.name, "csi-snapshot-webhook");
        // The selector is not re-derived from an overridden name
        assert_ne!(workload.app_label, "app=csi-snapshot-webhook");
    }

    #[test]
    fn test_selector_normalization() {
        let labeled = Workload::new().app_label("app=webhook");
        assert_eq!(labeled.selector(), "app=webhook");

        let bare = Workload::new().app_label("webhook");
        assert_eq!(bare.selector(), "app=webhook");
    }

    #[test]
    fn test_long_wait_copies() {
        let workload = Workload::new();
        let slow = workload.long_wait();

        assert_eq!(slow.max_wait_ready, Duration::from_secs(900));
        assert_eq!(workload.max_wait_ready, Duration::from_secs(300));
        assert_eq!(slow.name, workload.name);

        let slower = workload.with_wait_timeout(Duration::from_secs(1800));
        assert_eq!(slower.max_wait_ready, Duration::from_secs(1800));
        assert_eq!(workload.max_wait_ready, Duration::from_secs(300));
    }

    #[test]
    fn test_replicas_match() {
        assert!(replicas_match("2", "2"));
        assert!(!replicas_match("2", "1"));
        assert!(!replicas_match("2", ""));

        // Zero desired: the schema omits availableReplicas entirely
        assert!(replicas_match("0", ""));
        assert!(replicas_match("0", "0"));
        assert!(!replicas_match("1", "0"));
    }

    #[test]
    fn test_parse_replicas() {
        assert_eq!(parse_replicas("0").unwrap(), 0);
        assert_eq!(parse_replicas("3").unwrap(), 3);
        assert!(matches!(
            parse_replicas("-1"),
            Err(ContextError::InvalidReplicas(_))
        ));
        assert!(matches!(
            parse_replicas("two"),
            Err(ContextError::InvalidReplicas(_))
        ));
        assert!(matches!(
            parse_replicas(""),
            Err(ContextError::InvalidReplicas(_))
        ));
    }

    #[test]
    fn test_poll_interval_scales_with_window() {
        let workload = Workload::new();
        assert_eq!(workload.poll_interval(), Duration::from_secs(15));
        assert_eq!(workload.long_wait().poll_interval(), Duration::from_secs(45));
    }
}
