//! In-memory scene and location source for testing and simulation

use crate::core::{GeoFix, LocalPosition};
use crate::hardware::{
    HeadingReading, LocationSource, LocationUpdate, NodeTransform, SceneError, SceneInterface,
    SceneResult, SceneTransaction, TrackingState, WorldAlignment,
};
use crate::processing::registry::NodeId;
use nalgebra::Vector3;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Mock scene backend recording every mutation
#[derive(Debug, Default)]
pub struct MockScene {
    viewer_position: Option<LocalPosition>,
    viewer_orientation: Option<Vector3<f64>>,
    tracking_state: TrackingState,
    alignment: Option<WorldAlignment>,
    running: bool,
    root_established: bool,
    axes_shown: bool,
    attached: BTreeSet<NodeId>,
    transforms: HashMap<NodeId, NodeTransform>,
    transactions: Vec<SceneTransaction>,
    heading_offset_deg: f64,
    require_running: bool,
}

impl MockScene {
    /// Create a mock scene without tracking
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock scene whose tracking frame is already established at `position`
    pub fn tracking_at(position: LocalPosition) -> Self {
        Self {
            viewer_position: Some(position),
            viewer_orientation: Some(Vector3::zeros()),
            tracking_state: TrackingState::Normal,
            ..Self::default()
        }
    }

    /// Refuse transactions while the session is not started
    pub fn require_running(mut self) -> Self {
        self.require_running = true;
        self
    }

    pub fn set_viewer_position(&mut self, position: Option<LocalPosition>) {
        self.viewer_position = position;
    }

    /// Shift the viewer by `offset`; no-op while tracking is unavailable
    pub fn move_viewer_by(&mut self, offset: LocalPosition) {
        if let Some(position) = self.viewer_position.as_mut() {
            *position += offset;
        }
    }

    pub fn set_viewer_orientation(&mut self, orientation: Option<Vector3<f64>>) {
        self.viewer_orientation = orientation;
    }

    pub fn set_tracking_state(&mut self, state: TrackingState) {
        self.tracking_state = state;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alignment(&self) -> Option<WorldAlignment> {
        self.alignment
    }

    pub fn is_root_established(&self) -> bool {
        self.root_established
    }

    pub fn axes_shown(&self) -> bool {
        self.axes_shown
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.attached.contains(&id)
    }

    pub fn attached_nodes(&self) -> Vec<NodeId> {
        self.attached.iter().copied().collect()
    }

    /// Latest transform applied to `id`
    pub fn transform(&self, id: NodeId) -> Option<&NodeTransform> {
        self.transforms.get(&id)
    }

    pub fn transactions(&self) -> &[SceneTransaction] {
        &self.transactions
    }

    pub fn heading_offset(&self) -> f64 {
        self.heading_offset_deg
    }
}

impl SceneInterface for MockScene {
    fn viewer_position(&self) -> Option<LocalPosition> {
        self.viewer_position
    }

    fn viewer_orientation(&self) -> Option<Vector3<f64>> {
        self.viewer_orientation
    }

    fn tracking_state(&self) -> TrackingState {
        self.tracking_state
    }

    fn start(&mut self, alignment: WorldAlignment) -> SceneResult<()> {
        self.alignment = Some(alignment);
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn establish_root(&mut self, show_axes: bool) -> SceneResult<()> {
        self.root_established = true;
        self.axes_shown = show_axes;
        Ok(())
    }

    fn attach_node(&mut self, id: NodeId) -> SceneResult<()> {
        if !self.root_established {
            return Err(SceneError::RootNotEstablished);
        }
        if !self.attached.insert(id) {
            return Err(SceneError::NodeAlreadyAttached(id));
        }
        Ok(())
    }

    fn detach_node(&mut self, id: NodeId) -> SceneResult<()> {
        self.transforms.remove(&id);
        if self.attached.remove(&id) {
            Ok(())
        } else {
            Err(SceneError::NodeNotFound(id))
        }
    }

    fn apply_transaction(&mut self, transaction: SceneTransaction) -> SceneResult<()> {
        if self.require_running && !self.running {
            return Err(SceneError::SessionNotRunning);
        }
        for transform in &transaction.transforms {
            self.transforms.insert(transform.id, *transform);
        }
        self.transactions.push(transaction);
        Ok(())
    }

    fn rotate_heading(&mut self, degrees: f64) -> SceneResult<()> {
        if !self.root_established {
            return Err(SceneError::RootNotEstablished);
        }
        self.heading_offset_deg += degrees;
        Ok(())
    }

    fn reset_heading(&mut self) -> SceneResult<()> {
        if !self.root_established {
            return Err(SceneError::RootNotEstablished);
        }
        self.heading_offset_deg = 0.0;
        Ok(())
    }
}

/// Scripted location source
#[derive(Debug, Default)]
pub struct MockLocationSource {
    queue: VecDeque<LocationUpdate>,
    delivered: usize,
}

impl MockLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_fix(&mut self, fix: GeoFix) {
        self.queue.push_back(LocationUpdate::Location(fix));
    }

    pub fn push_heading(&mut self, reading: HeadingReading) {
        self.queue.push_back(LocationUpdate::Heading(reading));
    }

    pub fn queued_update_count(&self) -> usize {
        self.queue.len()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered
    }
}

impl LocationSource for MockLocationSource {
    fn poll_update(&mut self) -> Option<LocationUpdate> {
        let update = self.queue.pop_front()?;
        self.delivered += 1;
        Some(update)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
