//! Collaborator interfaces for the tracking scene and the location source
//!
//! The engine never talks to a renderer or a GPS receiver directly; it goes
//! through `SceneInterface` and `LocationSource`, with in-memory mocks for
//! tests and simulation.

pub mod error;
pub mod location;
pub mod mock;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use location::{ChannelLocationSource, HeadingReading, LocationSource, LocationUpdate};
pub use mock::{MockLocationSource, MockScene};
pub use scene::{NodeTransform, SceneInterface, SceneTransaction, TrackingState, WorldAlignment};
