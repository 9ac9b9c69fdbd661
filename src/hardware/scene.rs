//! Scene/tracking collaborator interface

use crate::core::LocalPosition;
use crate::hardware::SceneResult;
use crate::processing::registry::NodeId;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the tracking frame aligns its axes when the session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldAlignment {
    /// Y follows gravity, heading arbitrary
    Gravity,
    /// Y follows gravity and -Z points to true north
    GravityAndHeading,
}

/// Tracking quality reported by the scene backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    NotAvailable,
    Initializing,
    InsufficientFeatures,
    ExcessiveMotion,
    Relocalizing,
    Normal,
}

/// Visual state of one marker as pushed to the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub id: NodeId,
    /// Node position in the scene frame; the node's own scale stays 1
    pub position: LocalPosition,
    /// Uniform scale applied to the node's children
    pub child_scale: f64,
    /// Pivot offset of the node
    pub pivot: Vector3<f64>,
}

/// Batch of node transforms committed atomically with one animation duration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneTransaction {
    pub animation_duration: Duration,
    pub transforms: Vec<NodeTransform>,
}

impl SceneTransaction {
    pub fn new(animation_duration: Duration) -> Self {
        Self {
            animation_duration,
            transforms: Vec::new(),
        }
    }

    pub fn push(&mut self, transform: NodeTransform) {
        self.transforms.push(transform);
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }
}

/// Rendering and tracking backend driven by the engine
pub trait SceneInterface {
    /// Viewer position in the root node's frame, `None` until tracking starts
    fn viewer_position(&self) -> Option<LocalPosition>;

    /// Viewer orientation as Euler angles (radians)
    fn viewer_orientation(&self) -> Option<Vector3<f64>>;

    /// Current tracking quality
    fn tracking_state(&self) -> TrackingState;

    /// Start or restart the tracking session
    fn start(&mut self, alignment: WorldAlignment) -> SceneResult<()>;

    /// Pause the tracking session
    fn pause(&mut self);

    /// Create the root node that holds every marker, optionally with an axes marker
    fn establish_root(&mut self, show_axes: bool) -> SceneResult<()>;

    /// Attach a marker node under the root
    fn attach_node(&mut self, id: NodeId) -> SceneResult<()>;

    /// Remove a marker node from the scene
    fn detach_node(&mut self, id: NodeId) -> SceneResult<()>;

    /// Apply a batch of transforms as one animated transaction
    fn apply_transaction(&mut self, transaction: SceneTransaction) -> SceneResult<()>;

    /// Rotate the root node about the vertical axis (positive is anticlockwise)
    fn rotate_heading(&mut self, degrees: f64) -> SceneResult<()>;

    /// Restore the root node's original heading
    fn reset_heading(&mut self) -> SceneResult<()>;
}
