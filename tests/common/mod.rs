//! Shared scenario plumbing
//!
//! Every scenario needs the same three things: an opt-in gate (these
//! tests disrupt a live cluster), a connected context targeting the
//! storage operator namespace, and the platform gates that tell us
//! whether the snapshot subsystem exists on this cluster at all.

use snapcheck::{Context, StorageOperator};

/// Env var opting into cluster-disrupting runs
pub const RUN_ENV: &str = "CONFORMANCE_RUN";

/// Skip unless the caller opted in with CONFORMANCE_RUN=1
pub fn should_skip() -> bool {
    std::env::var(RUN_ENV).is_err()
}

/// Connect to the cluster, targeting the storage operator namespace
pub async fn harness() -> (Context, StorageOperator) {
    snapcheck::telemetry::init_logging();
    let target = StorageOperator::default();
    let ctx = Context::with_namespace(target.namespace.clone())
        .await
        .expect("failed to connect to the cluster");
    (ctx, target)
}

/// Why the snapshot scenarios cannot run on this cluster, if they can't
///
/// The CSISnapshot capability can be disabled at install time, and on
/// external control-plane topologies the snapshot controllers run on a
/// management cluster out of this harness's reach.
pub async fn snapshot_skip_reason(ctx: &Context) -> Option<String> {
    if !ctx.capability_enabled("CSISnapshot").await.unwrap_or(false) {
        return Some("CSISnapshot capability is not enabled on the test cluster".to_string());
    }

    let topology = ctx
        .control_plane_topology()
        .await
        .expect("failed to read control plane topology");
    if topology == snapcheck::context::EXTERNAL_TOPOLOGY {
        return Some(
            "clusters with an external control plane do not run the snapshot controllers"
                .to_string(),
        );
    }

    None
}
