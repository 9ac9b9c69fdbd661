use crate::core::{GeoFix, GeoPoint};
use crate::hardware::HeadingReading;
use thiserror::Error;

/// Configuration for fix validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Fixes with a coarser horizontal accuracy are dropped (meters, `None` keeps all)
    pub max_horizontal_accuracy_m: Option<f64>,
    /// Lowest plausible altitude (meters)
    pub min_altitude_m: f64,
    /// Highest plausible altitude (meters)
    pub max_altitude_m: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_horizontal_accuracy_m: None,
            min_altitude_m: -500.0,  // below the Dead Sea shore
            max_altitude_m: 12000.0,
        }
    }
}

/// Reasons a sensor reading is refused before reaching the estimate store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixRejection {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("altitude {altitude:.1} m outside [{min:.1}, {max:.1}]")]
    AltitudeOutOfRange { altitude: f64, min: f64, max: f64 },
    #[error("invalid horizontal accuracy {0}")]
    InvalidAccuracy(f64),
    #[error("horizontal accuracy {accuracy:.1} m coarser than {limit:.1} m")]
    AccuracyTooCoarse { accuracy: f64, limit: f64 },
    #[error("non-finite heading")]
    InvalidHeading,
}

/// Running counts of accepted and rejected readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStatistics {
    pub accepted_fixes: u64,
    pub rejected_fixes: u64,
    pub rejected_headings: u64,
}

/// Gatekeeper for fixes and headings coming from the location source
#[derive(Debug, Default)]
pub struct FixValidator {
    config: ValidationConfig,
    statistics: ValidationStatistics,
}

impl FixValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            statistics: ValidationStatistics::default(),
        }
    }

    pub fn update_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    /// Check a geodetic point against coordinate and altitude ranges
    pub fn validate_point(&self, point: &GeoPoint) -> Result<(), FixRejection> {
        if !point.latitude.is_finite() || !(-90.0..=90.0).contains(&point.latitude) {
            return Err(FixRejection::LatitudeOutOfRange(point.latitude));
        }

        if !point.longitude.is_finite() || !(-180.0..=180.0).contains(&point.longitude) {
            return Err(FixRejection::LongitudeOutOfRange(point.longitude));
        }

        if !point.altitude.is_finite()
            || point.altitude < self.config.min_altitude_m
            || point.altitude > self.config.max_altitude_m
        {
            return Err(FixRejection::AltitudeOutOfRange {
                altitude: point.altitude,
                min: self.config.min_altitude_m,
                max: self.config.max_altitude_m,
            });
        }

        Ok(())
    }

    /// Validate a fix and record the outcome
    pub fn validate_fix(&mut self, fix: &GeoFix) -> Result<(), FixRejection> {
        let result = self.check_fix(fix);
        match result {
            Ok(()) => self.statistics.accepted_fixes += 1,
            Err(_) => self.statistics.rejected_fixes += 1,
        }
        result
    }

    /// Validate a heading reading and record rejections
    pub fn validate_heading(&mut self, reading: &HeadingReading) -> Result<(), FixRejection> {
        if reading.resolved_heading().is_finite() {
            Ok(())
        } else {
            self.statistics.rejected_headings += 1;
            Err(FixRejection::InvalidHeading)
        }
    }

    pub fn statistics(&self) -> ValidationStatistics {
        self.statistics
    }

    fn check_fix(&self, fix: &GeoFix) -> Result<(), FixRejection> {
        self.validate_point(&fix.point)?;

        // Negative accuracy marks an invalid reading
        if !fix.horizontal_accuracy.is_finite() || fix.horizontal_accuracy < 0.0 {
            return Err(FixRejection::InvalidAccuracy(fix.horizontal_accuracy));
        }

        if let Some(limit) = self.config.max_horizontal_accuracy_m {
            if fix.horizontal_accuracy > limit {
                return Err(FixRejection::AccuracyTooCoarse {
                    accuracy: fix.horizontal_accuracy,
                    limit,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64, accuracy: f64) -> GeoFix {
        GeoFix::new(GeoPoint::new(lat, lon, 10.0), accuracy, 1_000)
    }

    #[test]
    fn test_valid_fix_accepted() {
        let mut validator = FixValidator::new();

        assert!(validator.validate_fix(&fix(37.7749, -122.4194, 5.0)).is_ok());
        assert_eq!(validator.statistics().accepted_fixes, 1);
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let mut validator = FixValidator::new();

        assert_eq!(
            validator.validate_fix(&fix(91.0, 0.0, 5.0)),
            Err(FixRejection::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            validator.validate_fix(&fix(0.0, -181.0, 5.0)),
            Err(FixRejection::LongitudeOutOfRange(-181.0))
        );
        assert!(validator.validate_fix(&fix(f64::NAN, 0.0, 5.0)).is_err());
        assert_eq!(validator.statistics().rejected_fixes, 3);
    }

    #[test]
    fn test_negative_accuracy_rejected() {
        let mut validator = FixValidator::new();

        assert_eq!(
            validator.validate_fix(&fix(10.0, 10.0, -1.0)),
            Err(FixRejection::InvalidAccuracy(-1.0))
        );
    }

    #[test]
    fn test_accuracy_limit() {
        let mut validator = FixValidator::with_config(ValidationConfig {
            max_horizontal_accuracy_m: Some(50.0),
            ..ValidationConfig::default()
        });

        assert!(validator.validate_fix(&fix(10.0, 10.0, 50.0)).is_ok());
        assert!(matches!(
            validator.validate_fix(&fix(10.0, 10.0, 65.0)),
            Err(FixRejection::AccuracyTooCoarse { .. })
        ));
    }

    #[test]
    fn test_heading_validation() {
        let mut validator = FixValidator::new();

        assert!(validator.validate_heading(&HeadingReading::new(90.0, 92.0, 5.0)).is_ok());
        assert_eq!(
            validator.validate_heading(&HeadingReading::new(f64::NAN, f64::NAN, 5.0)),
            Err(FixRejection::InvalidHeading)
        );
        assert_eq!(validator.statistics().rejected_headings, 1);
    }
}
