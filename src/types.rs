// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Coordinate ──────────────────────────────────────────────────────────────

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Finite and inside [-180, 180] x [-90, 90].
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

// ─── NodeCode ────────────────────────────────────────────────────────────────

/// Short airport code, unique within a network (e.g. `LON`).
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeCode(pub String);

impl NodeCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeCode {
    fn from(s: String) -> Self { NodeCode(s) }
}

impl From<&str> for NodeCode {
    fn from(s: &str) -> Self { NodeCode(s.to_string()) }
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub code: NodeCode,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

impl Node {
    pub fn new(code: &str, name: &str, lon: f64, lat: f64) -> Self {
        Self { code: code.into(), name: name.to_string(), lon, lat }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }
}

// ─── RoutePair ───────────────────────────────────────────────────────────────

/// Endpoint pair of a route. Two pairs describe the same route when their
/// endpoint sets are equal, see [`RoutePair::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutePair(pub NodeCode, pub NodeCode);

/// Direction-free identity of a pair: endpoints in sorted order.
pub type PairKey = (NodeCode, NodeCode);

impl RoutePair {
    pub fn new(a: &str, b: &str) -> Self {
        RoutePair(a.into(), b.into())
    }

    pub fn key(&self) -> PairKey {
        pair_key(&self.0, &self.1)
    }

    pub fn reversed(&self) -> Self {
        RoutePair(self.1.clone(), self.0.clone())
    }

    pub fn touches(&self, code: &NodeCode) -> bool {
        &self.0 == code || &self.1 == code
    }

    pub fn is_loop(&self) -> bool {
        self.0 == self.1
    }
}

pub fn pair_key(a: &NodeCode, b: &NodeCode) -> PairKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

// ─── RouteKind / RouteId ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Base,
    Hub,
    Reroute,
    Bypass,
}

impl RouteKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Hub => "hub",
            Self::Reroute => "reroute",
            Self::Bypass => "bypass",
        }
    }
}

/// Deterministic route identifier, `<kind>:<A>-<B>[-<C>...]`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub String);

impl RouteId {
    pub fn new(kind: RouteKind, from: &NodeCode, to: &NodeCode) -> Self {
        RouteId(format!("{}:{}-{}", kind.tag(), from, to))
    }

    pub fn for_path(kind: RouteKind, path: &[NodeCode]) -> Self {
        let joined: Vec<&str> = path.iter().map(NodeCode::as_str).collect();
        RouteId(format!("{}:{}", kind.tag(), joined.join("-")))
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Route ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub kind: RouteKind,
    pub origin: NodeCode,
    pub destination: NodeCode,
    pub coords: Vec<Coordinate>,
}

impl Route {
    pub fn pair(&self) -> RoutePair {
        RoutePair(self.origin.clone(), self.destination.clone())
    }
}

// ─── Render Feed ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Active,
    Paused,
    Rerouted,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightView {
    pub id: String,
    pub origin: NodeCode,
    pub destination: NodeCode,
    pub route: RouteId,
    pub position: Coordinate,
    /// Bearing of the current segment in degrees, clockwise from north.
    pub heading: f64,
    pub progress: f64,
    pub status: FlightStatus,
}

/// Everything the presentation layer needs to redraw the static network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub topology: String,
    pub scenario: Option<String>,
    pub nodes: Vec<Node>,
    pub routes: Vec<Route>,
    pub disrupted: Vec<Route>,
    pub corrected: Vec<Route>,
}

// ─── FrameUpdate ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FrameUpdate {
    pub elapsed: f64,
    pub flights: Vec<FlightView>,
    /// Flights dropped from this frame because their binding did not resolve.
    pub violations: Vec<String>,
    /// The corrected-path highlight expired during this frame.
    pub corrected_cleared: bool,
}

// ─── CommandResult ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandStatus {
    Applied,
    /// Correction applied, but these flights had no matching reroute and
    /// stay paused on their original route.
    Partial { stranded: Vec<String> },
    NoOp { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    #[serde(flatten)]
    pub status: CommandStatus,
    pub narration: Option<String>,
    pub superseded: Option<String>,
    pub snapshot: NetworkSnapshot,
}

impl CommandResult {
    pub fn is_no_op(&self) -> bool {
        matches!(self.status, CommandStatus::NoOp { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_ignores_direction() {
        assert_eq!(RoutePair::new("NYC", "LON").key(), RoutePair::new("LON", "NYC").key());
        assert_ne!(RoutePair::new("NYC", "LON").key(), RoutePair::new("NYC", "CHI").key());
    }

    #[test]
    fn route_ids_are_deterministic() {
        let a = NodeCode::from("LON");
        let b = NodeCode::from("NYC");
        assert_eq!(RouteId::new(RouteKind::Base, &a, &b).0, "base:LON-NYC");
        assert_eq!(RouteId::new(RouteKind::Base, &b, &a).0, "base:NYC-LON");
        let path = vec![a, NodeCode::from("FRA"), b];
        assert_eq!(RouteId::for_path(RouteKind::Reroute, &path).0, "reroute:LON-FRA-NYC");
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(-74.0, 40.7).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 95.0).is_valid());
        assert!(!Coordinate::new(181.0, 0.0).is_valid());
    }
}
