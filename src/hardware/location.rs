//! Location source interface

use crate::core::GeoFix;
use crossbeam_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};

/// Compass reading as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Heading relative to true north (degrees)
    pub true_heading: f64,
    /// Heading relative to magnetic north (degrees)
    pub magnetic_heading: f64,
    /// Accuracy in degrees; negative when the true heading is unreliable
    pub accuracy: f64,
}

impl HeadingReading {
    pub fn new(true_heading: f64, magnetic_heading: f64, accuracy: f64) -> Self {
        Self {
            true_heading,
            magnetic_heading,
            accuracy,
        }
    }

    /// True heading when its accuracy is valid, magnetic heading otherwise
    pub fn resolved_heading(&self) -> f64 {
        if self.accuracy >= 0.0 {
            self.true_heading
        } else {
            self.magnetic_heading
        }
    }
}

/// Update pushed by a location source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LocationUpdate {
    Location(GeoFix),
    Heading(HeadingReading),
}

/// Asynchronous provider of GPS fixes and compass headings
pub trait LocationSource: Send {
    /// Next pending update, `None` when nothing is queued (non-blocking)
    fn poll_update(&mut self) -> Option<LocationUpdate>;

    /// Human-readable source name for logging
    fn name(&self) -> &str;
}

/// Location source fed through a crossbeam channel
pub struct ChannelLocationSource {
    name: String,
    receiver: Receiver<LocationUpdate>,
    disconnected: bool,
}

impl ChannelLocationSource {
    pub fn new(name: impl Into<String>, receiver: Receiver<LocationUpdate>) -> Self {
        Self {
            name: name.into(),
            receiver,
            disconnected: false,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl LocationSource for ChannelLocationSource {
    fn poll_update(&mut self) -> Option<LocationUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    log::warn!("Location source '{}' disconnected", self.name);
                    self.disconnected = true;
                }
                None
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
