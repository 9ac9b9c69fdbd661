//! Marker node registry
//!
//! Markers are addressed by `NodeId`; ids are never reused and iteration
//! follows insertion order.

use crate::core::{GeoFix, GeoPoint, LocalPosition};
use crate::utils::config::PoiConfig;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Registry handle for a marker node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A virtual marker anchored to a real-world location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerNode {
    /// Geodetic location; authoritative once `confirmed`
    pub location: Option<GeoFix>,
    /// Position in the scene frame
    pub position: LocalPosition,
    /// Distance clamp factor from the last placement (1 when not clamped)
    pub scale: f64,
    /// Scale applied to the node's children
    pub render_scale: f64,
    /// Pivot offset keeping the marker on the ground
    pub pivot: Vector3<f64>,
    /// Location frozen; never reverts
    pub confirmed: bool,
    pub tag: String,
    /// Recompute position and scale on every tick
    pub continually_update_position_and_scale: bool,
    /// Keep moving the node to its geodetic location even when close to the viewer
    pub continually_adjust_position_when_within_range: bool,
    /// Render with the clamp factor instead of a distance-based size
    pub scale_relative_to_distance: bool,
}

impl Default for MarkerNode {
    fn default() -> Self {
        Self {
            location: None,
            position: Vector3::zeros(),
            scale: 1.0,
            render_scale: 1.0,
            pivot: Vector3::zeros(),
            confirmed: false,
            tag: String::new(),
            continually_update_position_and_scale: true,
            continually_adjust_position_when_within_range: true,
            scale_relative_to_distance: false,
        }
    }
}

impl MarkerNode {
    /// Unconfirmed node without a location
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Node with a caller-confirmed location
    pub fn at_location(location: GeoFix) -> Self {
        Self {
            location: Some(location),
            confirmed: true,
            ..Self::default()
        }
    }

    /// Confirmed annotation that keeps its clamp factor as render scale
    pub fn annotation(location: GeoFix) -> Self {
        Self {
            scale_relative_to_distance: true,
            ..Self::at_location(location)
        }
    }

    /// Confirmed node for a configured point of interest, tagged with its title
    pub fn from_poi(poi: &PoiConfig) -> Self {
        let point = GeoPoint::new(poi.latitude, poi.longitude, poi.altitude);
        Self {
            tag: poi.title.clone(),
            ..Self::at_location(GeoFix::new(point, 0.0, 0))
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_position(mut self, position: LocalPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_continual_updates(mut self, enabled: bool) -> Self {
        self.continually_update_position_and_scale = enabled;
        self
    }

    pub fn with_adjust_within_range(mut self, enabled: bool) -> Self {
        self.continually_adjust_position_when_within_range = enabled;
        self
    }
}

/// Owned set of placed markers
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    nodes: BTreeMap<NodeId, MarkerNode>,
    next_id: u32,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: MarkerNode) -> NodeId {
        self.next_id += 1;
        let id = NodeId::new(self.next_id);
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&MarkerNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MarkerNode> {
        self.nodes.get_mut(&id)
    }

    /// Remove a node; `None` when it was not registered
    pub fn remove(&mut self, id: NodeId) -> Option<MarkerNode> {
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ids of nodes carrying `tag`; an empty tag matches nothing
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        if tag.is_empty() {
            return Vec::new();
        }

        self.nodes
            .iter()
            .filter(|(_, node)| node.tag == tag)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        !self.find_by_tag(tag).is_empty()
    }

    /// Snapshot of ids in insertion order
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MarkerNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
