//! Flat-earth geodetic math for local-scale scene placement
//!
//! Converts between geodetic points and signed local translations using two
//! fixed projection radii, one per horizontal axis. The approximation is only
//! meant for distances of a few kilometers; no antimeridian or pole handling.
//!
//! Scene-frame helpers operate on the ground plane (XZ) of the tracking frame.

use crate::core::{
    GeoFix, GeoPoint, GroundPoint, LocalPosition, Translation, LATITUDE_RADIUS_M,
    LONGITUDE_RADIUS_M,
};
use std::f64::consts::FRAC_PI_2;

/// Bearing that moves along the latitude axis
pub const BEARING_LATITUDE: f64 = 0.0;

/// Bearing that moves along the longitude axis
pub const BEARING_LONGITUDE: f64 = FRAC_PI_2;

/// Project `distance_m` from `origin` along `bearing_radians`.
///
/// The latitude component uses `LATITUDE_RADIUS_M` and the longitude
/// component `LONGITUDE_RADIUS_M`. Negative distances project backwards.
pub fn coordinate_with_bearing(origin: &GeoPoint, bearing_radians: f64, distance_m: f64) -> GeoPoint {
    let dist_rad_lat = distance_m / LATITUDE_RADIUS_M;
    let dist_rad_lon = distance_m / LONGITUDE_RADIUS_M;

    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * dist_rad_lat.cos()
        + lat1.cos() * dist_rad_lat.sin() * bearing_radians.cos())
    .asin();
    let lon2 = lon1
        + (bearing_radians.sin() * dist_rad_lon.sin() * lat1.cos())
            .atan2(dist_rad_lon.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        latitude: lat2.to_degrees(),
        longitude: lon2.to_degrees(),
        altitude: origin.altitude,
    }
}

/// Great-circle length between two points on a sphere of the given radius
fn haversine(from: &GeoPoint, to: &GeoPoint, radius_m: f64) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * radius_m * a.sqrt().min(1.0).asin()
}

/// Signed offset from `from` to `to`.
///
/// Measures two orthogonal legs through an intermediate point that shares
/// `from`'s latitude and `to`'s longitude.
pub fn translation(from: &GeoPoint, to: &GeoPoint) -> Translation {
    let inbetween = GeoPoint::new(from.latitude, to.longitude, from.altitude);

    let distance_latitude = haversine(&inbetween, to, LATITUDE_RADIUS_M);
    let latitude_translation = if to.latitude > inbetween.latitude {
        distance_latitude
    } else {
        -distance_latitude
    };

    let distance_longitude = haversine(from, &inbetween, LONGITUDE_RADIUS_M);
    let longitude_translation = if from.longitude > inbetween.longitude {
        -distance_longitude
    } else {
        distance_longitude
    };

    Translation {
        latitude_translation,
        longitude_translation,
        altitude_translation: to.altitude - from.altitude,
    }
}

/// Apply `translation` to `origin`; inverse of [`translation`].
pub fn translated_location(origin: &GeoPoint, translation: &Translation) -> GeoPoint {
    let latitude_coordinate =
        coordinate_with_bearing(origin, BEARING_LATITUDE, translation.latitude_translation);
    let longitude_coordinate =
        coordinate_with_bearing(origin, BEARING_LONGITUDE, translation.longitude_translation);

    GeoPoint {
        latitude: latitude_coordinate.latitude,
        longitude: longitude_coordinate.longitude,
        altitude: origin.altitude + translation.altitude_translation,
    }
}

/// Horizontal geodetic distance, consistent with [`translation`]
pub fn distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    translation(from, to).horizontal_magnitude()
}

/// Ground-plane projection of a scene position
pub fn ground_point(position: &LocalPosition) -> GroundPoint {
    GroundPoint::new(position.x, -position.z)
}

/// Distance between two scene positions on the ground plane (y ignored)
pub fn ground_distance(a: &LocalPosition, b: &LocalPosition) -> f64 {
    (ground_point(a) - ground_point(b)).norm()
}

/// Inclusive ground-plane radius test around `center`
pub fn radius_contains(center: &LocalPosition, radius: f64, point: &LocalPosition) -> bool {
    let delta = ground_point(point) - ground_point(center);
    delta.norm_squared() <= radius * radius
}

impl GeoFix {
    /// Copy of this fix moved by `translation`, keeping accuracy and timestamp
    pub fn translated(&self, translation: &Translation) -> GeoFix {
        GeoFix {
            point: translated_location(&self.point, translation),
            ..*self
        }
    }

    /// Offset from this fix to `other`
    pub fn translation_to(&self, other: &GeoFix) -> Translation {
        translation(&self.point, &other.point)
    }

    /// Horizontal distance from this fix to `other`
    pub fn distance_to(&self, other: &GeoFix) -> f64 {
        distance(&self.point, &other.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn origin() -> GeoPoint {
        GeoPoint::new(51.5007, -0.1246, 20.0)
    }

    #[test]
    fn test_bearing_zero_moves_latitude_only() {
        let moved = coordinate_with_bearing(&origin(), BEARING_LATITUDE, 500.0);

        assert!(moved.latitude > origin().latitude);
        assert_abs_diff_eq!(moved.longitude, origin().longitude, epsilon = 1e-12);
        assert_abs_diff_eq!(
            (moved.latitude - origin().latitude).to_radians() * LATITUDE_RADIUS_M,
            500.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_bearing_ninety_moves_longitude() {
        let moved = coordinate_with_bearing(&origin(), BEARING_LONGITUDE, 500.0);

        assert!(moved.longitude > origin().longitude);
        assert_abs_diff_eq!(moved.latitude, origin().latitude, epsilon = 1e-6);
    }

    #[test]
    fn test_translation_signs() {
        let from = origin();
        let north_east = GeoPoint::new(from.latitude + 0.001, from.longitude + 0.001, 25.0);
        let south_west = GeoPoint::new(from.latitude - 0.001, from.longitude - 0.001, 15.0);

        let ne = translation(&from, &north_east);
        assert!(ne.latitude_translation > 0.0);
        assert!(ne.longitude_translation > 0.0);
        assert_abs_diff_eq!(ne.altitude_translation, 5.0, epsilon = 1e-12);

        let sw = translation(&from, &south_west);
        assert!(sw.latitude_translation < 0.0);
        assert!(sw.longitude_translation < 0.0);
        assert_abs_diff_eq!(sw.altitude_translation, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_round_trip_within_half_meter() {
        let legs = [-999.0, -640.0, -75.5, 0.0, 12.0, 333.3, 999.0];

        for &lat in &legs {
            for &lon in &legs {
                let requested = Translation::new(lat, lon, lat / 10.0);
                let target = translated_location(&origin(), &requested);
                let measured = translation(&origin(), &target);

                assert_abs_diff_eq!(measured.latitude_translation, lat, epsilon = 0.5);
                assert_abs_diff_eq!(measured.longitude_translation, lon, epsilon = 0.5);
                assert_abs_diff_eq!(measured.altitude_translation, lat / 10.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_distance_matches_translation_magnitude() {
        let target = translated_location(&origin(), &Translation::new(300.0, 400.0, 0.0));

        assert_abs_diff_eq!(distance(&origin(), &target), 500.0, epsilon = 0.5);
        assert_abs_diff_eq!(distance(&origin(), &origin()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ground_distance_ignores_height() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 50.0, -4.0);

        assert_abs_diff_eq!(ground_distance(&a, &b), 5.0, epsilon = 1e-12);
        assert_eq!(ground_point(&b), GroundPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_radius_contains_is_inclusive() {
        let center = Vector3::new(0.0, 0.0, 0.0);

        assert!(radius_contains(&center, 100.0, &Vector3::new(100.0, 7.0, 0.0)));
        assert!(!radius_contains(&center, 100.0, &Vector3::new(100.01, 0.0, 0.0)));
    }

    #[test]
    fn test_translated_fix_keeps_accuracy_and_timestamp() {
        let fix = GeoFix::new(origin(), 4.0, 1_000).with_vertical_accuracy(3.0);
        let moved = fix.translated(&Translation::new(10.0, 0.0, 1.0));

        assert_eq!(moved.horizontal_accuracy, 4.0);
        assert_eq!(moved.vertical_accuracy, 3.0);
        assert_eq!(moved.timestamp_ms, 1_000);
        assert_abs_diff_eq!(moved.altitude(), 21.0, epsilon = 1e-12);
    }
}
