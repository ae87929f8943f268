// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Errors

use crate::scenario::ScenarioTrack;
use crate::types::{NodeCode, RouteId};

/// Malformed configuration or node data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("airport {code} has invalid coordinates ({lon}, {lat})")]
    InvalidCoordinate { code: String, lon: f64, lat: f64 },

    #[error("airport code must not be empty")]
    EmptyCode,

    #[error("invalid setting `{0}`")]
    InvalidSetting(&'static str),

    #[error("config parse failed: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Reasons a command leaves the session unchanged. Surfaced to callers as a
/// no-op result, never as a fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("no active disruption to correct")]
    NothingToCorrect,

    #[error("no {0} scenarios configured")]
    NoScenarios(ScenarioTrack),

    #[error("unknown airport: {0}")]
    UnknownAirport(String),

    #[error("{0} is already part of the network")]
    DuplicateAirport(NodeCode),

    #[error("hub {0} is not part of the network")]
    UnknownHub(NodeCode),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Internal invariant violations detected while ticking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("flight {flight} is bound to missing route {route}")]
    DanglingBinding { flight: String, route: RouteId },
}
