use super::{Context, ContextError};
use k8s_openapi::api::core::v1::Secret;
use serde_json::{Map, Value};
use tracing::info;

impl Context {
    /// Remove the given annotation keys from a Secret
    ///
    /// A JSON merge patch with null values deletes the keys (RFC 7396),
    /// the `kubectl annotate key-` idiom. Removing a serving-cert expiry
    /// annotation forces the platform to regenerate the certificate,
    /// which is the disruption the webhook scenarios exercise.
    ///
    /// # Example
    ///
    /// ```ignore
    /// ctx.strip_secret_annotations(
    ///     "csi-snapshot-webhook-secret",
    ///     &["service.alpha.openshift.io/expiry", "service.beta.openshift.io/expiry"],
    /// ).await?;
    /// ```
    pub async fn strip_secret_annotations(
        &self,
        name: &str,
        keys: &[&str],
    ) -> Result<Secret, ContextError> {
        let nulls: Map<String, Value> = keys
            .iter()
            .map(|key| ((*key).to_string(), Value::Null))
            .collect();

        let patch = serde_json::json!({
            "metadata": { "annotations": nulls }
        });

        let secret = self.patch::<Secret>(name, &patch).await?;

        info!(
            namespace = %self.namespace,
            secret = %name,
            keys = ?keys,
            "Stripped secret annotations"
        );

        Ok(secret)
    }
}
