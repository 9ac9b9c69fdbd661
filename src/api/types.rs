//! Common API types: engine events and placement errors

use crate::core::{GeoFix, LocalPosition};
use crate::processing::registry::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for placement operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Placement contract failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The tracking frame has no viewer position yet
    #[error("tracking frame not established")]
    TrackingUnavailable,
    /// No current location can be derived
    #[error("current location unavailable")]
    LocationUnavailable,
    /// Node passed for confirmed placement lacks a confirmed location
    #[error("node has no confirmed location")]
    UnconfirmedLocation,
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
}

/// Observable engine state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A fix was recorded at the viewer's scene position
    EstimateAdded { position: LocalPosition, fix: GeoFix },
    /// An estimate drifted out of the scene radius
    EstimateRemoved { position: LocalPosition, fix: GeoFix },
    /// A node's geodetic location was frozen
    NodeConfirmed { id: NodeId, location: GeoFix },
    /// The root scene node exists and markers are attached to it
    RootEstablished,
    /// Position and scale were recomputed for a node
    NodeUpdated {
        id: NodeId,
        position: LocalPosition,
        scale: f64,
        render_scale: f64,
    },
}

impl EngineEvent {
    /// Short event name for logs and text output
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::EstimateAdded { .. } => "estimate_added",
            EngineEvent::EstimateRemoved { .. } => "estimate_removed",
            EngineEvent::NodeConfirmed { .. } => "node_confirmed",
            EngineEvent::RootEstablished => "root_established",
            EngineEvent::NodeUpdated { .. } => "node_updated",
        }
    }

    /// Node the event refers to, if any
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            EngineEvent::NodeConfirmed { id, .. } | EngineEvent::NodeUpdated { id, .. } => Some(*id),
            _ => None,
        }
    }
}
