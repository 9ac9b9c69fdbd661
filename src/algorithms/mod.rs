//! Coordinate algorithms

pub mod geodetic;

pub use geodetic::{
    coordinate_with_bearing, distance, ground_distance, ground_point, radius_contains,
    translated_location, translation,
};
