//! Sensor data validation

pub mod data;

pub use data::{FixRejection, FixValidator, ValidationConfig, ValidationStatistics};
