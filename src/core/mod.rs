//! Core types and constants for geodetic scene placement

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
