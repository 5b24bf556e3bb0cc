//! Client configuration.
//!
//! Every field has a default matching the reference course, so a config
//! document only needs the keys it overrides:
//!
//! ```json
//! { "service_url": "ws://robot.local:8765", "route_timeout_ms": null }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How the user disambiguates between several candidate routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Click near a candidate's polyline.
    #[default]
    LineClick,
    /// Click a numbered control per candidate.
    ControlList,
}

impl SelectionMode {
    pub fn toggled(self) -> Self {
        match self {
            SelectionMode::LineClick => SelectionMode::ControlList,
            SelectionMode::ControlList => SelectionMode::LineClick,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::LineClick => "line",
            SelectionMode::ControlList => "list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "line" => Some(SelectionMode::LineClick),
            "list" => Some(SelectionMode::ControlList),
            _ => None,
        }
    }
}

/// What the host should do after the service connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Stay disconnected until the user reloads.
    #[default]
    Never,
    /// Retry after a fixed delay, at most `max_attempts` times in a row.
    Fixed { delay_ms: u64, max_attempts: u32 },
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (1-based), or
    /// `None` to give up.
    pub fn next_delay(&self, attempt: u32) -> Option<u64> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Fixed {
                delay_ms,
                max_attempts,
            } => (attempt >= 1 && attempt <= max_attempts).then_some(delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub service_url: String,
    pub vertex_hit_radius: f64,
    pub edge_marker_hit_radius: f64,
    pub route_hit_threshold: f64,
    /// `None` waits for the service forever.
    pub route_timeout_ms: Option<u64>,
    pub reconnect: ReconnectPolicy,
    pub selection_mode: SelectionMode,
    /// The service answers `selected_path` frames too (the reference
    /// service replies with an `error`).
    pub expect_confirmation_reply: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: "ws://localhost:8765".to_string(),
            vertex_hit_radius: 25.0,
            edge_marker_hit_radius: 15.0,
            route_hit_threshold: 5.0,
            route_timeout_ms: Some(15_000),
            reconnect: ReconnectPolicy::Never,
            selection_mode: SelectionMode::LineClick,
            expect_confirmation_reply: true,
        }
    }
}

impl ClientConfig {
    /// Load a (possibly partial) JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("vertex_hit_radius", self.vertex_hit_radius),
            ("edge_marker_hit_radius", self.edge_marker_hit_radius),
            ("route_hit_threshold", self.route_hit_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidRadius { field, value });
            }
        }
        Ok(())
    }
}
