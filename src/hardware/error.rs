//! Collaborator error types

use crate::processing::registry::NodeId;
use thiserror::Error;

/// Failures reported by a scene backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// Root scene node has not been created yet
    #[error("root scene node not established")]
    RootNotEstablished,
    /// Node is not attached to the scene
    #[error("node {0} not found in scene")]
    NodeNotFound(NodeId),
    /// Node is already attached
    #[error("node {0} already attached")]
    NodeAlreadyAttached(NodeId),
    /// Session is paused or was never started
    #[error("scene session not running")]
    SessionNotRunning,
    /// Backend-specific failure
    #[error("scene backend error: {0}")]
    Backend(String),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
