use crate::core::{
    DEFAULT_ANIMATION_DURATION_MS, DEFAULT_HEADING_STEP_DEG, DEFAULT_TICK_INTERVAL_MS,
    SCENE_LIMIT_M,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Source of the viewer's current geodetic location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    /// Use the latest raw GPS fix as-is
    GpsOnly,
    /// Reproject the best scene location estimate to the viewer's position
    BestEstimate,
}

impl Default for EstimateMethod {
    fn default() -> Self {
        EstimateMethod::BestEstimate
    }
}

/// Preset point of interest placed as a confirmed marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiConfig {
    /// Marker tag
    pub title: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude in meters
    #[serde(default)]
    pub altitude: f64,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How the current location is derived
    pub estimate_method: EstimateMethod,
    /// Add an axes marker to the root node
    pub show_axes: bool,
    /// Align the tracking frame's -Z with true north
    pub orient_to_true_north: bool,
    /// Ground radius bounding estimates and unconfirmed nodes (meters)
    pub scene_limit_m: f64,
    /// Reconciliation period (milliseconds)
    pub tick_interval_ms: u64,
    /// Animation duration for continual node updates (milliseconds)
    pub animation_duration_ms: u64,
    /// Manual heading correction step (degrees)
    pub heading_step_deg: f64,
    /// Points of interest placed on demand
    pub points_of_interest: Vec<PoiConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimate_method: EstimateMethod::default(),
            show_axes: false,
            orient_to_true_north: true,
            scene_limit_m: SCENE_LIMIT_M,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            heading_step_deg: DEFAULT_HEADING_STEP_DEG,
            points_of_interest: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn with_estimate_method(mut self, method: EstimateMethod) -> Self {
        self.estimate_method = method;
        self
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Two points of interest share a title
    #[error("duplicate point of interest '{0}'")]
    DuplicatePoi(String),
    /// Configuration file I/O error
    #[error("config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON (de)serialization error
    #[error("config serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `save` called before any file was loaded or saved
    #[error("no file path set for saving configuration")]
    NoFilePath,
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error, if any
    pub fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Owns the active configuration and its backing file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: EngineConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration after validation
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        Self::validate(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Switch estimate method, returning the previous one
    pub fn set_estimate_method(&mut self, method: EstimateMethod) -> EstimateMethod {
        let old = self.config.estimate_method;
        self.config.estimate_method = method;
        self.is_modified = true;
        old
    }

    /// Add a point of interest; titles must be unique
    pub fn add_point_of_interest(&mut self, poi: PoiConfig) -> Result<(), ConfigError> {
        if self.config.points_of_interest.iter().any(|p| p.title == poi.title) {
            return Err(ConfigError::DuplicatePoi(poi.title));
        }
        if let Some(error) = Self::validate_poi(&poi) {
            return Err(error);
        }

        self.config.points_of_interest.push(poi);
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;

        let validation = Self::validate(&config);
        for warning in &validation.warnings {
            log::warn!("{}: {}", path_str, warning);
        }
        validation.into_result()?;

        log::info!(
            "Loaded configuration from {} ({} points of interest)",
            path_str,
            config.points_of_interest.len()
        );
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = serde_json::to_string_pretty(&self.config)?;

        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoFilePath),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Validate a configuration without applying it
    pub fn validate(config: &EngineConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !(config.scene_limit_m.is_finite() && config.scene_limit_m > 0.0) {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "scene_limit_m".to_string(),
                value: config.scene_limit_m.to_string(),
                reason: "must be a positive distance".to_string(),
            });
        } else if config.scene_limit_m > 1000.0 {
            result.warnings.push(format!(
                "scene_limit_m {} exceeds the range where the flat-earth approximation holds",
                config.scene_limit_m
            ));
        }

        if config.tick_interval_ms == 0 {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "tick_interval_ms".to_string(),
                value: "0".to_string(),
                reason: "reconciliation period must be non-zero".to_string(),
            });
        }

        if config.animation_duration_ms > config.tick_interval_ms.saturating_mul(10) {
            result.warnings.push(format!(
                "animation_duration_ms {} is much longer than the tick period",
                config.animation_duration_ms
            ));
        }

        if !(config.heading_step_deg.is_finite() && config.heading_step_deg > 0.0) {
            result.errors.push(ConfigError::InvalidParameter {
                parameter: "heading_step_deg".to_string(),
                value: config.heading_step_deg.to_string(),
                reason: "must be a positive angle".to_string(),
            });
        }

        let mut titles = HashSet::new();
        for poi in &config.points_of_interest {
            if let Some(error) = Self::validate_poi(poi) {
                result.errors.push(error);
            }
            if !titles.insert(poi.title.as_str()) {
                result.errors.push(ConfigError::DuplicatePoi(poi.title.clone()));
            }
        }

        result
    }

    fn validate_poi(poi: &PoiConfig) -> Option<ConfigError> {
        let reason = if poi.title.is_empty() {
            "title must not be empty"
        } else if !(-90.0..=90.0).contains(&poi.latitude) {
            "latitude must be within [-90, 90]"
        } else if !(-180.0..=180.0).contains(&poi.longitude) {
            "longitude must be within [-180, 180]"
        } else if !poi.altitude.is_finite() {
            "altitude must be finite"
        } else {
            return None;
        };

        Some(ConfigError::InvalidParameter {
            parameter: format!("points_of_interest[{}]", poi.title),
            value: format!("({}, {}, {})", poi.latitude, poi.longitude, poi.altitude),
            reason: reason.to_string(),
        })
    }
}
