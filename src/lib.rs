//! Scene Location
//!
//! Anchors virtual markers to real-world GPS coordinates inside a drift-prone
//! local tracking frame. Noisy fixes are paired with the viewer's scene
//! position as location estimates; the best estimate places, confirms and
//! rescales markers as the viewer moves.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use crate::core::{GeoFix, GeoPoint, LocalPosition, Translation, SCENE_LIMIT_M};
pub use algorithms::geodetic;
pub use processing::{LocationEstimate, LocationEstimateStore, MarkerNode, MarkerRegistry, NodeId};
pub use validation::FixValidator;
pub use hardware::{
    HeadingReading, LocationSource, LocationUpdate, MockScene, SceneError, SceneInterface,
    SceneResult, SceneTransaction, TrackingState, WorldAlignment,
};
pub use api::{
    ApiError, ApiResult, EngineEvent, EventDispatcher, JsonFormatter, SceneLocationEngine, Session,
    TextFormatter,
};
pub use utils::{ConfigError, ConfigurationManager, EngineConfig, EstimateMethod, PoiConfig};
