use crate::algorithms::geodetic;
use crate::core::{
    GeoFix, LocalPosition, FAR_DISTANCE_M, FAR_DISTANCE_SCALE_FACTOR, PIVOT_DROP_FACTOR,
    RENDER_SCALE_PER_METER, SCENE_LIMIT_M,
};
use crate::processing::registry::MarkerNode;
use nalgebra::Vector3;

/// Result of the position/scale policy for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    /// New scene position; `None` leaves the node where it is
    pub position: Option<LocalPosition>,
    /// Distance clamp factor
    pub scale: f64,
    /// Scale for the node's children
    pub render_scale: f64,
    pub pivot: Vector3<f64>,
    /// Geodetic distance between viewer and node
    pub distance: f64,
    /// Distance the render scale was derived from
    pub adjusted_distance: f64,
}

/// Compute where a node goes and how large it renders.
///
/// `current_location` is the viewer's derived location at `viewer_position`;
/// `node_location` is the node's location as resolved for this tick.
pub fn compute_placement(
    node: &MarkerNode,
    node_location: &GeoFix,
    viewer_position: &LocalPosition,
    current_location: &GeoFix,
    initial_setup: bool,
) -> NodePlacement {
    compute_placement_with_limit(
        node,
        node_location,
        viewer_position,
        current_location,
        initial_setup,
        SCENE_LIMIT_M,
    )
}

/// [`compute_placement`] with a custom clamp distance
pub fn compute_placement_with_limit(
    node: &MarkerNode,
    node_location: &GeoFix,
    viewer_position: &LocalPosition,
    current_location: &GeoFix,
    initial_setup: bool,
    limit_m: f64,
) -> NodePlacement {
    let translation = current_location.translation_to(node_location);
    let distance = current_location.distance_to(node_location);

    let geodetic_placement = node.confirmed
        && (distance > limit_m
            || node.continually_adjust_position_when_within_range
            || initial_setup);

    let (position, scale, adjusted_distance) = if geodetic_placement {
        if distance > limit_m {
            // Too far away: pull it in to the limit and shrink it
            let scale = limit_m / distance;
            let offset = translation.scaled(scale).to_local_offset();
            (Some(viewer_position + offset), scale, distance * scale)
        } else {
            let offset = translation.to_local_offset();
            (Some(viewer_position + offset), 1.0, distance)
        }
    } else {
        // Location not yet trusted: size by the visual distance in the scene
        let scene_distance = geodetic::ground_distance(viewer_position, &node.position);
        (None, 1.0, scene_distance)
    };

    let render_scale = if node.scale_relative_to_distance {
        scale
    } else {
        let mut render_scale = adjusted_distance * RENDER_SCALE_PER_METER;
        if distance > FAR_DISTANCE_M {
            render_scale *= FAR_DISTANCE_SCALE_FACTOR;
        }
        render_scale
    };

    NodePlacement {
        position,
        scale,
        render_scale,
        pivot: Vector3::new(0.0, -PIVOT_DROP_FACTOR * render_scale, 0.0),
        distance,
        adjusted_distance,
    }
}

impl NodePlacement {
    /// Write the placement into `node`
    pub fn apply_to(&self, node: &mut MarkerNode) {
        if let Some(position) = self.position {
            node.position = position;
        }
        node.scale = self.scale;
        node.render_scale = self.render_scale;
        node.pivot = self.pivot;
    }
}
