// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Session Configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::ArcStyle;
use crate::network::Topology;
use crate::presets;
use crate::scenario::ScenarioBook;
use crate::types::Node;

const MAX_FLIGHTS: usize = 10_000;
const MAX_ARC_RESOLUTION: usize = 4096;

/// Everything a session needs at start-up. Every field has a default, so a
/// partial JSON object (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for flight phases and speed factors.
    pub seed: u64,
    pub max_flights: usize,
    /// Segments per arc.
    pub arc_resolution: usize,
    pub arc_style: ArcStyle,
    /// How long the corrected-path highlight stays after a correction.
    pub highlight_hold_secs: f64,
    /// View zoom used to size segments on screen.
    pub zoom: f64,
    /// Flight speed in screen pixels per second at zoom 2.
    pub base_speed: f64,
    /// Upper bound on a single frame delta.
    pub max_frame_secs: f64,
    pub log_level: String,
    /// Airports present from the start.
    pub nodes: Vec<Node>,
    /// Airports that can be added later by code.
    pub catalog: Vec<Node>,
    pub topology: Topology,
    /// Hub used by the hub-mode preset.
    pub hub: String,
    pub scenarios: ScenarioBook,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_flights: 16,
            arc_resolution: 160,
            arc_style: ArcStyle::GreatCircle,
            highlight_hold_secs: 0.9,
            zoom: 2.2,
            base_speed: 88.0,
            max_frame_secs: 0.05,
            log_level: "info".to_string(),
            nodes: presets::base_nodes(),
            catalog: presets::optional_airports(),
            topology: presets::normal_topology(),
            hub: presets::HUB.to_string(),
            scenarios: presets::scenario_book(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_flights > MAX_FLIGHTS {
            return Err(ConfigError::InvalidSetting("max_flights"));
        }
        if self.arc_resolution == 0 || self.arc_resolution > MAX_ARC_RESOLUTION {
            return Err(ConfigError::InvalidSetting("arc_resolution"));
        }
        if !self.highlight_hold_secs.is_finite() || self.highlight_hold_secs < 0.0 {
            return Err(ConfigError::InvalidSetting("highlight_hold_secs"));
        }
        if !self.zoom.is_finite() {
            return Err(ConfigError::InvalidSetting("zoom"));
        }
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(ConfigError::InvalidSetting("base_speed"));
        }
        if !self.max_frame_secs.is_finite() || self.max_frame_secs <= 0.0 {
            return Err(ConfigError::InvalidSetting("max_frame_secs"));
        }
        if let ArcStyle::Bezier { bend } = self.arc_style {
            if !bend.is_finite() {
                return Err(ConfigError::InvalidSetting("arc_style.bend"));
            }
        }
        self.log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| ConfigError::InvalidSetting("log_level"))?;
        Ok(())
    }

    pub fn level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.nodes.len(), 13);
    }

    #[test]
    fn partial_override() {
        let config = SessionConfig::from_json(
            r#"{"seed": 42, "arc_style": {"style": "bezier", "bend": 0.2}, "topology": {"mode": "all_to_all"}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.arc_style, ArcStyle::Bezier { bend: 0.2 });
        assert_eq!(config.topology, Topology::AllToAll);
        assert_eq!(config.max_flights, 16);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert_eq!(
            SessionConfig::from_json(r#"{"arc_resolution": 0}"#),
            Err(ConfigError::InvalidSetting("arc_resolution"))
        );
        assert_eq!(
            SessionConfig::from_json(r#"{"log_level": "loud"}"#),
            Err(ConfigError::InvalidSetting("log_level"))
        );
        assert!(matches!(SessionConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn oversized_settings_are_rejected() {
        let huge = format!(r#"{{"max_flights": {}}}"#, usize::MAX);
        assert_eq!(SessionConfig::from_json(&huge), Err(ConfigError::InvalidSetting("max_flights")));
        assert_eq!(
            SessionConfig::from_json(r#"{"arc_resolution": 100000000}"#),
            Err(ConfigError::InvalidSetting("arc_resolution"))
        );
        assert!(SessionConfig::from_json(r#"{"max_flights": 10000, "arc_resolution": 4096}"#).is_ok());
    }
}
