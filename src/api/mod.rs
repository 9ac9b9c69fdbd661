//! Engine API
//!
//! The reconciliation engine, its event types and the threaded session that
//! drives it, plus text and JSON formatting of events.

pub mod callback;
pub mod engine;
pub mod formatting;
pub mod session;
pub mod types;

// Re-export commonly used API types
pub use callback::{CallbackHandle, EventCallback, EventDispatcher};
pub use engine::SceneLocationEngine;
pub use formatting::{JsonFormatter, TextFormatter};
pub use session::{Session, SessionError};
pub use types::{ApiError, ApiResult, EngineEvent};
