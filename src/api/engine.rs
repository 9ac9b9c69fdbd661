//! Reconciliation engine
//!
//! Ties the estimate store, the marker registry and the placement policy to a
//! scene backend. One `tick` evicts stale estimates, confirms distant markers
//! and pushes recomputed transforms to the scene as a single transaction.

use crate::api::types::{ApiError, ApiResult, EngineEvent};
use crate::algorithms::geodetic;
use crate::core::{GeoFix, LocalPosition};
use crate::hardware::{
    HeadingReading, LocationUpdate, NodeTransform, SceneInterface, SceneResult, SceneTransaction,
    TrackingState, WorldAlignment,
};
use crate::processing::placement::compute_placement_with_limit;
use crate::processing::{LocationEstimate, LocationEstimateStore, MarkerNode, MarkerRegistry, NodeId};
use crate::utils::config::{ConfigError, ConfigurationManager, EngineConfig, EstimateMethod};
use crate::validation::{FixValidator, ValidationStatistics};
use nalgebra::Vector3;
use std::time::Duration;

/// Geospatial-to-scene reconciliation engine
pub struct SceneLocationEngine<S: SceneInterface> {
    config: EngineConfig,
    scene: S,
    validator: FixValidator,
    estimates: LocationEstimateStore,
    registry: MarkerRegistry,
    latest_fix: Option<GeoFix>,
    heading: Option<f64>,
    tracking_state: Option<TrackingState>,
    root_established: bool,
    did_fetch_initial_location: bool,
    running: bool,
    events: Vec<EngineEvent>,
}

impl<S: SceneInterface> SceneLocationEngine<S> {
    /// Create an engine over `scene`, rejecting an invalid configuration
    pub fn new(config: EngineConfig, scene: S) -> Result<Self, ConfigError> {
        let validation = ConfigurationManager::validate(&config);
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }
        validation.into_result()?;

        let estimates = LocationEstimateStore::with_radius(config.scene_limit_m);
        Ok(Self {
            config,
            scene,
            validator: FixValidator::new(),
            estimates,
            registry: MarkerRegistry::new(),
            latest_fix: None,
            heading: None,
            tracking_state: None,
            root_established: false,
            did_fetch_initial_location: false,
            running: false,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_root_established(&self) -> bool {
        self.root_established
    }

    pub fn tracking_state(&self) -> Option<TrackingState> {
        self.tracking_state
    }

    pub fn validation_statistics(&self) -> ValidationStatistics {
        self.validator.statistics()
    }

    // ---- Lifecycle ----

    /// Start the tracking session and enable ticking
    pub fn start(&mut self) -> SceneResult<()> {
        let alignment = if self.config.orient_to_true_north {
            WorldAlignment::GravityAndHeading
        } else {
            WorldAlignment::Gravity
        };

        self.scene.start(alignment)?;
        self.running = true;
        log::info!("Scene session started with {:?} alignment", alignment);
        Ok(())
    }

    /// Pause the tracking session; ticks become no-ops until restarted
    pub fn pause(&mut self) {
        self.scene.pause();
        self.running = false;
        log::info!("Scene session paused");
    }

    /// Render-tick hook
    pub fn on_frame_rendered(&mut self) {
        let state = self.scene.tracking_state();
        self.on_tracking_state_changed(state);

        if !self.root_established {
            self.establish_root();
        }

        if !self.did_fetch_initial_location {
            if let (Some(position), Some(fix)) = (self.current_position(), self.latest_fix) {
                self.record_estimate(fix, Some(position));
                self.did_fetch_initial_location = true;
                log::debug!("Captured initial location estimate");
            }
        }
    }

    fn establish_root(&mut self) {
        if let Err(e) = self.scene.establish_root(self.config.show_axes) {
            log::warn!("Failed to establish root node: {}", e);
            return;
        }
        self.root_established = true;

        for id in self.registry.ids() {
            if let Err(e) = self.scene.attach_node(id) {
                log::warn!("Failed to attach node {}: {}", id, e);
            }
        }

        log::info!(
            "Root node established with {} markers{}",
            self.registry.len(),
            if self.config.show_axes { " and axes" } else { "" }
        );
        self.events.push(EngineEvent::RootEstablished);
    }

    // ---- Sensor input ----

    pub fn handle_update(&mut self, update: LocationUpdate) {
        match update {
            LocationUpdate::Location(fix) => self.on_location_update(fix),
            LocationUpdate::Heading(reading) => self.on_heading_update(reading),
        }
    }

    /// Record a GPS fix as the latest raw fix and as an estimate
    pub fn on_location_update(&mut self, fix: GeoFix) {
        if let Err(rejection) = self.validator.validate_fix(&fix) {
            log::debug!("Ignoring fix at {} ms: {}", fix.timestamp_ms, rejection);
            return;
        }

        self.latest_fix = Some(fix);
        let position = self.current_position();
        self.record_estimate(fix, position);
    }

    pub fn on_heading_update(&mut self, reading: HeadingReading) {
        if let Err(rejection) = self.validator.validate_heading(&reading) {
            log::debug!("Ignoring heading: {}", rejection);
            return;
        }

        let heading = reading.resolved_heading();
        log::trace!("Heading {:.1}° (accuracy {:.1})", heading, reading.accuracy);
        self.heading = Some(heading);
    }

    fn record_estimate(&mut self, fix: GeoFix, position: Option<LocalPosition>) {
        if let Some((estimate, superseded)) = self.estimates.insert_estimate(fix, position) {
            for old in superseded {
                self.events.push(EngineEvent::EstimateRemoved {
                    position: old.position,
                    fix: old.fix,
                });
            }
            self.events.push(EngineEvent::EstimateAdded {
                position: estimate.position,
                fix: estimate.fix,
            });
        }
    }

    /// Log tracking quality transitions
    pub fn on_tracking_state_changed(&mut self, state: TrackingState) {
        if self.tracking_state == Some(state) {
            return;
        }

        match state {
            TrackingState::Normal => log::info!("Tracking normal"),
            TrackingState::NotAvailable => log::warn!("Tracking not available"),
            TrackingState::Initializing | TrackingState::Relocalizing => {
                log::info!("Tracking limited: {:?}", state)
            }
            TrackingState::InsufficientFeatures | TrackingState::ExcessiveMotion => {
                log::warn!("Tracking limited: {:?}", state)
            }
        }
        self.tracking_state = Some(state);
    }

    // ---- Queries ----

    pub fn current_position(&self) -> Option<LocalPosition> {
        self.scene.viewer_position()
    }

    pub fn current_orientation(&self) -> Option<Vector3<f64>> {
        self.scene.viewer_orientation()
    }

    /// Viewer location derived per the configured estimate method
    pub fn current_location(&self) -> Option<GeoFix> {
        match self.config.estimate_method {
            EstimateMethod::GpsOnly => self.latest_fix,
            EstimateMethod::BestEstimate => {
                let position = self.current_position()?;
                let best = self.estimates.best_estimate()?;
                Some(best.translated_location(&position))
            }
        }
    }

    pub fn best_estimate(&self) -> Option<&LocationEstimate> {
        self.estimates.best_estimate()
    }

    pub fn estimates(&self) -> &[LocationEstimate] {
        self.estimates.as_slice()
    }

    pub fn latest_fix(&self) -> Option<GeoFix> {
        self.latest_fix
    }

    /// Latest resolved compass heading (degrees)
    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    /// Geodetic location to use for `node` this tick
    pub fn location_of_node(&self, node: &MarkerNode) -> Option<GeoFix> {
        if node.confirmed || self.config.estimate_method == EstimateMethod::GpsOnly {
            return node.location;
        }

        if let Some(best) = self.estimates.best_estimate() {
            let tighter = node
                .location
                .map_or(true, |l| best.fix.horizontal_accuracy < l.horizontal_accuracy);
            if tighter {
                return Some(best.translated_location(&node.position));
            }
        }

        node.location
    }

    // ---- Reconciliation ----

    /// Run one reconciliation pass and drain every pending event
    pub fn tick(&mut self) -> Vec<EngineEvent> {
        if !self.running {
            return self.take_events();
        }

        self.remove_stale_estimates();
        self.confirm_distant_nodes();
        self.update_all_nodes(true);
        self.take_events()
    }

    /// Evict estimates outside the scene radius around the viewer
    pub fn remove_stale_estimates(&mut self) {
        let Some(position) = self.current_position() else {
            return;
        };

        for estimate in self.estimates.evict_stale(&position) {
            self.events.push(EngineEvent::EstimateRemoved {
                position: estimate.position,
                fix: estimate.fix,
            });
        }
    }

    /// Freeze the location of every unconfirmed node beyond the scene radius
    pub fn confirm_distant_nodes(&mut self) {
        let Some(position) = self.current_position() else {
            return;
        };
        let limit = self.config.scene_limit_m;

        for id in self.registry.ids() {
            let Some(node) = self.registry.get(id) else {
                continue;
            };
            if node.confirmed || geodetic::ground_distance(&position, &node.position) <= limit {
                continue;
            }

            // Nothing to freeze yet; retried next tick
            let Some(location) = self.location_of_node(node) else {
                continue;
            };

            if let Some(node) = self.registry.get_mut(id) {
                node.location = Some(location);
                node.confirmed = true;
            }
            log::debug!(
                "Confirmed node {} at ({:.6}, {:.6})",
                id,
                location.latitude(),
                location.longitude()
            );
            self.events.push(EngineEvent::NodeConfirmed { id, location });
        }
    }

    /// Recompute every continually updated node and commit one transaction
    pub fn update_all_nodes(&mut self, animated: bool) {
        let mut transaction = SceneTransaction::new(self.animation_duration(false, animated));

        for id in self.registry.ids() {
            let continual = self
                .registry
                .get(id)
                .map_or(false, |node| node.continually_update_position_and_scale);
            if !continual {
                continue;
            }
            if let Some(transform) = self.compute_node_update(id, false) {
                transaction.push(transform);
            }
        }

        self.commit(transaction);
    }

    /// Recompute a single node's position and scale.
    ///
    /// A known node without a resolvable location is left untouched.
    pub fn update_node_position_and_scale(
        &mut self,
        id: NodeId,
        initial_setup: bool,
        animated: bool,
    ) -> ApiResult<()> {
        if !self.registry.contains(id) {
            return Err(ApiError::NodeNotFound(id));
        }

        let mut transaction =
            SceneTransaction::new(self.animation_duration(initial_setup, animated));
        if let Some(transform) = self.compute_node_update(id, initial_setup) {
            transaction.push(transform);
        }
        self.commit(transaction);
        Ok(())
    }

    fn animation_duration(&self, initial_setup: bool, animated: bool) -> Duration {
        if initial_setup || !animated {
            Duration::ZERO
        } else {
            self.config.animation_duration()
        }
    }

    fn compute_node_update(&mut self, id: NodeId, initial_setup: bool) -> Option<NodeTransform> {
        let viewer = self.current_position()?;
        let current = self.current_location()?;
        let node = self.registry.get(id)?;
        let node_location = self.location_of_node(node)?;

        let placement = compute_placement_with_limit(
            node,
            &node_location,
            &viewer,
            &current,
            initial_setup,
            self.config.scene_limit_m,
        );

        let node = self.registry.get_mut(id)?;
        placement.apply_to(node);

        log::trace!(
            "Node {} at d={:.1} m: scale {:.3}, render scale {:.3}",
            id,
            placement.distance,
            placement.scale,
            placement.render_scale
        );
        self.events.push(EngineEvent::NodeUpdated {
            id,
            position: node.position,
            scale: node.scale,
            render_scale: node.render_scale,
        });

        Some(NodeTransform {
            id,
            position: node.position,
            child_scale: node.render_scale,
            pivot: node.pivot,
        })
    }

    fn commit(&mut self, transaction: SceneTransaction) {
        if transaction.is_empty() {
            return;
        }
        let count = transaction.len();
        if let Err(e) = self.scene.apply_transaction(transaction) {
            log::warn!("Failed to apply transaction of {} transforms: {}", count, e);
        }
    }

    // ---- Placement ----

    /// Place `node` at the viewer's current position and derived location
    pub fn place_at_current_position(&mut self, mut node: MarkerNode) -> ApiResult<NodeId> {
        let position = self.current_position().ok_or(ApiError::TrackingUnavailable)?;
        let location = self.current_location().ok_or(ApiError::LocationUnavailable)?;

        node.position = position;
        node.location = Some(location);
        node.confirmed = self.config.estimate_method == EstimateMethod::GpsOnly;

        let id = self.insert_node(node);
        log::debug!("Placed node {} at current position", id);
        Ok(id)
    }

    /// Place a node whose location the caller has already confirmed
    pub fn place_at_confirmed_location(&mut self, node: MarkerNode) -> ApiResult<NodeId> {
        if !node.confirmed || node.location.is_none() {
            return Err(ApiError::UnconfirmedLocation);
        }

        let id = self.insert_node(node);
        self.update_node_position_and_scale(id, true, false)?;
        log::debug!("Placed node {} at confirmed location", id);
        Ok(id)
    }

    /// Place every configured point of interest not already in the registry
    pub fn place_points_of_interest(&mut self) -> Vec<NodeId> {
        let pois = self.config.points_of_interest.clone();
        let mut placed = Vec::new();

        for poi in &pois {
            if self.registry.contains_tag(&poi.title) {
                continue;
            }
            match self.place_at_confirmed_location(MarkerNode::from_poi(poi)) {
                Ok(id) => placed.push(id),
                Err(e) => log::warn!("Failed to place point of interest '{}': {}", poi.title, e),
            }
        }

        log::info!("Placed {} of {} points of interest", placed.len(), pois.len());
        placed
    }

    fn insert_node(&mut self, node: MarkerNode) -> NodeId {
        let id = self.registry.insert(node);
        if self.root_established {
            if let Err(e) = self.scene.attach_node(id) {
                log::warn!("Failed to attach node {}: {}", id, e);
            }
        }
        id
    }

    /// Detach and delete a node; `None` when the id is unknown
    pub fn remove_node(&mut self, id: NodeId) -> Option<MarkerNode> {
        let node = self.registry.remove(id)?;
        if self.root_established {
            if let Err(e) = self.scene.detach_node(id) {
                log::warn!("Failed to detach node {}: {}", id, e);
            }
        }
        Some(node)
    }

    pub fn find_nodes(&self, tag: &str) -> Vec<NodeId> {
        self.registry.find_by_tag(tag)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.registry.contains_tag(tag)
    }

    pub fn node(&self, id: NodeId) -> Option<&MarkerNode> {
        self.registry.get(id)
    }

    // ---- Heading ----

    /// Rotate the root node; positive degrees turn anticlockwise
    pub fn rotate_scene(&mut self, degrees: f64) {
        if let Err(e) = self.scene.rotate_heading(degrees) {
            log::warn!("Failed to rotate scene by {:.1}°: {}", degrees, e);
        }
    }

    pub fn move_heading_clockwise(&mut self) {
        self.rotate_scene(-self.config.heading_step_deg);
    }

    pub fn move_heading_anticlockwise(&mut self) {
        self.rotate_scene(self.config.heading_step_deg);
    }

    pub fn reset_heading(&mut self) {
        if let Err(e) = self.scene.reset_heading() {
            log::warn!("Failed to reset heading: {}", e);
        }
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
