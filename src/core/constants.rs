//! Physical constants and placement parameters

/// Projection radius used for the latitude axis (meters)
pub const LATITUDE_RADIUS_M: f64 = 6_360_500.0;

/// Projection radius used for the longitude axis (meters)
pub const LONGITUDE_RADIUS_M: f64 = 5_602_900.0;

/// Ground-plane radius around the viewer that bounds estimates and unconfirmed nodes (meters)
pub const SCENE_LIMIT_M: f64 = 100.0;

/// Ground distance under which two estimates count as the same position (meters)
pub const SUPERSEDE_RADIUS_M: f64 = 0.01;

/// Render scale applied per meter of (adjusted) distance
pub const RENDER_SCALE_PER_METER: f64 = 0.181;

/// Geodetic distance beyond which markers get the far-distance reduction (meters)
pub const FAR_DISTANCE_M: f64 = 3000.0;

/// Extra render scale factor for markers beyond `FAR_DISTANCE_M`
pub const FAR_DISTANCE_SCALE_FACTOR: f64 = 0.75;

/// Pivot drop relative to render scale so markers rest on the ground
pub const PIVOT_DROP_FACTOR: f64 = 1.1;

/// Default reconciliation period (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Default animation duration for continual updates (milliseconds)
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 100;

/// Default manual heading correction step (degrees)
pub const DEFAULT_HEADING_STEP_DEG: f64 = 1.0;
