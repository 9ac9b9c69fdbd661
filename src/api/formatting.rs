//! Output formatting for engine events

use crate::api::types::EngineEvent;
use crate::core::{GeoFix, LocalPosition};

/// Human-readable text formatter
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// Decimal places for geodetic coordinates
    pub coordinate_precision: usize,
    /// Single-line output
    pub compact: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            coordinate_precision: 6,
            compact: true,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Multi-line output with one field per line
    pub fn detailed() -> Self {
        Self {
            compact: false,
            ..Self::default()
        }
    }

    fn fix(&self, fix: &GeoFix) -> String {
        format!(
            "{:.p$}°, {:.p$}°, {:.1} m ±{:.1} m",
            fix.latitude(),
            fix.longitude(),
            fix.altitude(),
            fix.horizontal_accuracy,
            p = self.coordinate_precision
        )
    }

    fn position(position: &LocalPosition) -> String {
        format!("({:.2}, {:.2}, {:.2})", position.x, position.y, position.z)
    }

    /// Format an event as text
    pub fn format_event(&self, event: &EngineEvent) -> String {
        let fields: Vec<(&str, String)> = match event {
            EngineEvent::EstimateAdded { position, fix }
            | EngineEvent::EstimateRemoved { position, fix } => vec![
                ("location", self.fix(fix)),
                ("scene", Self::position(position)),
            ],
            EngineEvent::NodeConfirmed { id, location } => {
                vec![("node", id.to_string()), ("location", self.fix(location))]
            }
            EngineEvent::RootEstablished => Vec::new(),
            EngineEvent::NodeUpdated {
                id,
                position,
                scale,
                render_scale,
            } => vec![
                ("node", id.to_string()),
                ("scene", Self::position(position)),
                ("scale", format!("{:.3}", scale)),
                ("render scale", format!("{:.3}", render_scale)),
            ],
        };

        let mut output = event.name().to_string();
        for (label, value) in fields {
            if self.compact {
                output.push_str(&format!(" {}={}", label.replace(' ', "_"), value));
            } else {
                output.push_str(&format!("\n  {:<13} {}", format!("{}:", label), value));
            }
        }
        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Format an event as a JSON object
    pub fn format_event(&self, event: &EngineEvent) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(event)
        } else {
            serde_json::to_string(event)
        }
    }

    /// Format a batch of events as a JSON array
    pub fn format_events(&self, events: &[EngineEvent]) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(events)
        } else {
            serde_json::to_string(events)
        }
    }
}
