//! Snapcheck - CSI snapshot operator conformance harness
//!
//! End-to-end conformance checks for the cluster CSI snapshot
//! controller operator: verifies that the snapshot controller and
//! webhook Deployments recover from external disruptions (deleted or
//! re-annotated serving-cert secrets), that feature-gated
//! VolumeGroupSnapshot behavior is wired through, and that the storage
//! ClusterOperator settles back to healthy after each disruption.
//!
//! The crate is a library of polling helpers plus a workload
//! descriptor; the scenarios themselves live in `tests/` and run
//! against a live cluster.
//!
//! # Example
//!
//! ```no_run
//! use snapcheck::{Context, PollTiming, Workload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = Context::new().await?;
//!
//!     let mut webhook = Workload::new().name("csi-snapshot-webhook");
//!     webhook.wait_ready(&ctx).await?;
//!
//!     ctx.wait_cluster_operator_settled("storage", &PollTiming::default())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod eventually;
pub mod telemetry;
pub mod wait;
pub mod workload;

// Re-export commonly used types
pub use config::{PollTiming, StorageOperator, EXPIRY_ANNOTATIONS};
pub use context::{Context, ContextError, Gvr, OperatorCondition};
pub use eventually::{eventually, ConditionError, Eventually};
pub use wait::WaitError;
pub use workload::Workload;
