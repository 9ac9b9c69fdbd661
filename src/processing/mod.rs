//! Estimate bookkeeping, marker registry and placement policy

pub mod estimates;
pub mod placement;
pub mod registry;

pub use estimates::{LocationEstimate, LocationEstimateStore};
pub use placement::{compute_placement, NodePlacement};
pub use registry::{MarkerNode, MarkerRegistry, NodeId};
