//! Core data types for geodetic and scene-frame positions

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Position in the scene's tracking frame (meters, y up, -z along the latitude axis)
pub type LocalPosition = Vector3<f64>;

/// Projection of a local position onto the ground plane as (x, -z)
pub type GroundPoint = Vector2<f64>;

/// Geodetic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// A single GPS reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub point: GeoPoint,
    /// Horizontal accuracy radius (meters, lower is better)
    pub horizontal_accuracy: f64,
    /// Vertical accuracy (meters)
    pub vertical_accuracy: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl GeoFix {
    pub fn new(point: GeoPoint, horizontal_accuracy: f64, timestamp_ms: u64) -> Self {
        Self {
            point,
            horizontal_accuracy,
            vertical_accuracy: 0.0,
            timestamp_ms,
        }
    }

    pub fn with_vertical_accuracy(mut self, vertical_accuracy: f64) -> Self {
        self.vertical_accuracy = vertical_accuracy;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.point.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.point.longitude
    }

    pub fn altitude(&self) -> f64 {
        self.point.altitude
    }
}

/// Signed local-frame offset between two geodetic points.
///
/// Not a geodesic distance: each leg is measured independently along the
/// latitude and longitude axes, so it only holds over short ranges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub latitude_translation: f64,
    pub longitude_translation: f64,
    pub altitude_translation: f64,
}

impl Translation {
    pub fn new(latitude_translation: f64, longitude_translation: f64, altitude_translation: f64) -> Self {
        Self {
            latitude_translation,
            longitude_translation,
            altitude_translation,
        }
    }

    /// Length of the latitude/longitude legs combined
    pub fn horizontal_magnitude(&self) -> f64 {
        self.latitude_translation.hypot(self.longitude_translation)
    }

    /// Uniformly scaled copy
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            latitude_translation: self.latitude_translation * factor,
            longitude_translation: self.longitude_translation * factor,
            altitude_translation: self.altitude_translation * factor,
        }
    }

    /// Scene-frame offset: longitude to x, altitude to y, latitude to -z
    pub fn to_local_offset(&self) -> LocalPosition {
        Vector3::new(
            self.longitude_translation,
            self.altitude_translation,
            -self.latitude_translation,
        )
    }
}
