//! Cluster connection context
//!
//! Provides a connection to a running cluster, targeted at the storage
//! operator's namespace. Unlike a scratch-namespace test SDK, this
//! context never creates or deletes namespaces: the subsystem under test
//! already exists and the harness only observes and disrupts it.
//!
//! # Errors
//!
//! All fallible methods in this module return `ContextError` which
//! provides detailed error information for Kubernetes operations:
//! - Client connection errors
//! - Resource read/delete/patch errors
//! - Wait/timeout errors

mod crud;
mod dynamic;
mod operator;
mod parsing;
mod platform;
mod secrets;

pub use dynamic::Gvr;
pub use operator::{conditions_healthy, OperatorCondition};
pub use parsing::{field_path, render_field};
pub use platform::EXTERNAL_TOPOLOGY;

use kube::Client;

use crate::config::StorageOperator;

/// Connection to the cluster hosting the storage operator
///
/// # Example
///
/// ```ignore
/// use snapcheck::Context;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let ctx = Context::new().await?;
///
///     let healthy = ctx.cluster_operator_healthy("storage").await?;
///     println!("storage operator healthy: {healthy}");
///     Ok(())
/// }
/// ```
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Namespace for namespaced operations
    pub namespace: String,
}

impl Context {
    /// Connect to the cluster and target the default storage operator
    /// namespace
    pub async fn new() -> Result<Self, ContextError> {
        Self::with_namespace(StorageOperator::default().namespace).await
    }

    /// Connect to the cluster and target the given namespace
    pub async fn with_namespace(namespace: impl Into<String>) -> Result<Self, ContextError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ContextError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            namespace: namespace.into(),
        })
    }
}

/// Errors from Context operations
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Failed to create Kubernetes client: {0}")]
    ClientError(String),

    #[error("Failed to get resource: {0}")]
    GetError(String),

    #[error("Failed to list resources: {0}")]
    ListError(String),

    #[error("Failed to delete resource: {0}")]
    DeleteError(String),

    #[error("Failed to patch resource: {0}")]
    PatchError(String),

    #[error("Invalid replica count: {0}")]
    InvalidReplicas(String),

    #[error("{0}")]
    WaitTimeout(#[from] crate::wait::WaitError),

    #[error("{0}")]
    NotConverged(#[from] crate::eventually::ConditionError),
}

/// Improve a kube error message with human-readable context
///
/// Parses common Kubernetes error patterns and returns a more
/// understandable message including resource name/kind.
pub(crate) fn improve_error_message(
    err: &kube::Error,
    resource_kind: &str,
    resource_name: &str,
) -> String {
    let raw = err.to_string();

    if raw.contains("NotFound") || raw.contains("404") {
        return format!("{resource_kind} '{resource_name}' not found");
    }

    if raw.contains("Forbidden") || raw.contains("403") {
        return format!("{resource_kind} '{resource_name}': permission denied (check RBAC)");
    }

    if raw.contains("connection refused") || raw.contains("ECONNREFUSED") {
        return format!("{resource_kind} '{resource_name}': cannot connect to Kubernetes API");
    }

    if raw.contains("timeout") || raw.contains("deadline exceeded") {
        return format!("{resource_kind} '{resource_name}': operation timed out");
    }

    format!("{resource_kind} '{resource_name}': {raw}")
}
