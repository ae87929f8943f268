// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Session Core

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::error::CommandError;
use crate::geometry::{GeometryProvider, WebMercator};
use crate::network::{dedup_tagged, NodeSet, Topology};
use crate::registry::RouteRegistry;
use crate::scenario::{AirportBlock, ScenarioEngine, ScenarioTrack};
use crate::stats::{self, AirportStats};
use crate::traffic::TrafficSimulator;
use crate::types::*;

// ─── Commands ────────────────────────────────────────────────────────────────

/// Airport to add: a catalogue code or a full definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Code(String),
    Node(Node),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetTopology { topology: Topology },
    Disrupt { track: ScenarioTrack },
    Correct,
    AddNode { node: NodeSpec },
}

// ─── World ───────────────────────────────────────────────────────────────────

/// Network state the scenario engine operates on.
pub struct World {
    pub(crate) nodes: NodeSet,
    pub(crate) topology: Topology,
    pub(crate) registry: RouteRegistry,
    pub(crate) traffic: TrafficSimulator,
}

impl World {
    pub fn from_config(config: &SessionConfig) -> Self {
        let geometry = GeometryProvider::new(config.arc_resolution, config.arc_style);
        let mut world = Self {
            nodes: NodeSet::from_nodes(config.nodes.iter().cloned()),
            topology: config.topology.clone(),
            registry: RouteRegistry::new(geometry),
            traffic: TrafficSimulator::new(
                ChaCha8Rng::seed_from_u64(config.seed),
                config.max_flights,
                config.base_speed,
            ),
        };
        world.rebuild(None);
        world
    }

    /// Rebuilds routes and flights for the current topology, routing around
    /// `block` when an airport closure is active.
    pub fn rebuild(&mut self, block: Option<&AirportBlock>) -> usize {
        let mut pairs = self.topology.build(&self.nodes);
        if let Some(b) = block {
            pairs.retain(|(p, _)| !p.touches(&b.block));
            pairs.extend(b.bypass_pairs.iter().map(|p| (p.clone(), RouteKind::Bypass)));
            pairs = dedup_tagged(pairs);
        }
        let built = self.registry.rebuild(&self.nodes, &pairs);
        self.traffic.populate(&self.registry);
        built
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn traffic(&self) -> &TrafficSimulator {
        &self.traffic
    }
}

// ─── Highlight Hold ──────────────────────────────────────────────────────────

/// Countdown for the corrected-path highlight. Re-arming replaces the
/// remaining time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HighlightHold {
    remaining: Option<f64>,
}

impl HighlightHold {
    pub fn arm(&mut self, secs: f64) {
        self.remaining = Some(secs);
    }

    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns true once, on the frame the hold expires.
    pub fn advance(&mut self, dt: f64) -> bool {
        match self.remaining {
            Some(left) if left - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}

// ─── AirwaysSession ──────────────────────────────────────────────────────────

struct Applied {
    status: CommandStatus,
    narration: Option<String>,
    superseded: Option<String>,
}

impl Applied {
    fn narrated(narration: String) -> Self {
        Self { status: CommandStatus::Applied, narration: Some(narration), superseded: None }
    }
}

#[wasm_bindgen]
pub struct AirwaysSession {
    pub(crate) config: SessionConfig,
    pub(crate) world: World,
    pub(crate) engine: ScenarioEngine,
    pub(crate) hold: HighlightHold,
    pub(crate) projection: WebMercator,
    pub(crate) elapsed: f64,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl AirwaysSession {
    pub fn with_config(config: SessionConfig) -> Self {
        let world = World::from_config(&config);
        log::info!(
            "session ready: {} airports, {} routes, {} flights",
            world.nodes.len(),
            world.registry.len(),
            world.traffic.flights().len()
        );
        Self {
            engine: ScenarioEngine::new(config.scenarios.clone()),
            projection: WebMercator::new(config.zoom),
            hold: HighlightHold::default(),
            elapsed: 0.0,
            world,
            config,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> CommandResult {
        let outcome = match command {
            Command::SetTopology { topology } => self.set_topology(topology),
            Command::Disrupt { track } => self.disrupt(track),
            Command::Correct => self.correct(),
            Command::AddNode { node } => self.add_node(node),
        };

        match outcome {
            Ok(applied) => CommandResult {
                status: applied.status,
                narration: applied.narration,
                superseded: applied.superseded,
                snapshot: self.snapshot(),
            },
            Err(e) => {
                log::warn!("command ignored: {}", e);
                CommandResult {
                    status: CommandStatus::NoOp { reason: e.to_string() },
                    narration: None,
                    superseded: None,
                    snapshot: self.snapshot(),
                }
            }
        }
    }

    fn set_topology(&mut self, topology: Topology) -> Result<Applied, CommandError> {
        if let Some(hub) = topology.hub() {
            if !self.world.nodes.contains(hub) {
                return Err(CommandError::UnknownHub(hub.clone()));
            }
        }
        let narration = match &topology {
            Topology::HubAndSpoke { hub } | Topology::HubWithCorridors { hub, .. } => {
                let name = self.world.nodes.get(hub).map_or(hub.as_str(), |n| n.name.as_str());
                format!("Hub {} enabled. Network operating in hub and spoke mode.", name)
            }
            _ => "Normal operations restored.".to_string(),
        };

        self.engine.reset(&mut self.world);
        self.hold.disarm();
        self.world.topology = topology;
        let routes = self.world.rebuild(None);
        log::info!("topology set to {}: {} routes", self.world.topology.label(), routes);
        Ok(Applied::narrated(narration))
    }

    fn add_node(&mut self, spec: NodeSpec) -> Result<Applied, CommandError> {
        let node = match spec {
            NodeSpec::Node(node) => node,
            NodeSpec::Code(code) => {
                let code = code.trim().to_uppercase();
                self.config
                    .catalog
                    .iter()
                    .find(|n| n.code.as_str() == code)
                    .cloned()
                    .ok_or(CommandError::UnknownAirport(code))?
            }
        };
        if self.world.nodes.contains(&node.code) {
            return Err(CommandError::DuplicateAirport(node.code));
        }
        let narration = format!("{} added.", node.name);
        self.world.nodes.insert(node)?;

        self.engine.reset(&mut self.world);
        self.hold.disarm();
        self.world.rebuild(None);
        Ok(Applied::narrated(narration))
    }

    fn disrupt(&mut self, track: ScenarioTrack) -> Result<Applied, CommandError> {
        let transition = self.engine.disrupt(&mut self.world, track)?;
        self.hold.disarm();
        Ok(Applied {
            status: CommandStatus::Applied,
            narration: Some(transition.narration),
            superseded: transition.superseded,
        })
    }

    fn correct(&mut self) -> Result<Applied, CommandError> {
        let correction = self.engine.correct(&mut self.world)?;
        self.hold.arm(self.config.highlight_hold_secs);
        let status = if correction.stranded.is_empty() {
            CommandStatus::Applied
        } else {
            CommandStatus::Partial { stranded: correction.stranded }
        };
        Ok(Applied { status, narration: Some(correction.narration), superseded: None })
    }

    /// Advances the simulation by one frame of `dt` seconds.
    pub fn tick_core(&mut self, dt: f64) -> FrameUpdate {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_frame_secs) } else { 0.0 };
        self.elapsed += dt;

        let corrected_cleared = self.hold.advance(dt);
        if corrected_cleared {
            self.world.registry.clear_corrected();
        }

        let (flights, errors) = self.world.traffic.advance(&self.world.registry, &self.projection, dt);
        let violations = errors
            .into_iter()
            .map(|e| {
                log::error!("{}", e);
                e.to_string()
            })
            .collect();

        FrameUpdate { elapsed: self.elapsed, flights, violations, corrected_cleared }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            topology: self.world.topology.label(),
            scenario: self.engine.active_name().map(str::to_string),
            nodes: self.world.nodes.to_vec(),
            routes: self.world.registry.routes().cloned().collect(),
            disrupted: self.world.registry.disrupted().to_vec(),
            corrected: self.world.registry.corrected().to_vec(),
        }
    }

    pub fn stats_core(&self) -> Vec<AirportStats> {
        stats::dashboard(&self.world.nodes, &self.world.traffic, &self.world.registry)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn engine(&self) -> &ScenarioEngine {
        &self.engine
    }

    pub fn hold(&self) -> HighlightHold {
        self.hold
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.projection = WebMercator::new(zoom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_resets_instead_of_stacking() {
        let mut hold = HighlightHold::default();
        hold.arm(0.9);
        assert!(!hold.advance(0.5));
        hold.arm(0.9);
        assert!(!hold.advance(0.5));
        assert!(hold.advance(0.5));
        assert!(!hold.is_armed());
        assert!(!hold.advance(0.5));
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let c: Command = serde_json::from_str(r#"{"type":"disrupt","track":"airports"}"#).unwrap();
        assert_eq!(c, Command::Disrupt { track: ScenarioTrack::Airports });
        let c: Command = serde_json::from_str(r#"{"type":"correct"}"#).unwrap();
        assert_eq!(c, Command::Correct);
        let c: Command = serde_json::from_str(r#"{"type":"add_node","node":"PAR"}"#).unwrap();
        assert_eq!(c, Command::AddNode { node: NodeSpec::Code("PAR".into()) });
        let c: Command = serde_json::from_str(
            r#"{"type":"add_node","node":{"code":"LIS","name":"Lisbon","lon":-9.14,"lat":38.72}}"#,
        )
        .unwrap();
        assert_eq!(c, Command::AddNode { node: NodeSpec::Node(Node::new("LIS", "Lisbon", -9.14, 38.72)) });
    }

    #[test]
    fn correction_arms_hold_and_tick_clears_overlay() {
        let mut session = AirwaysSession::with_config(SessionConfig::default());
        session.dispatch(Command::Disrupt { track: ScenarioTrack::Routes });
        session.dispatch(Command::Correct);
        assert!(session.hold().is_armed());
        assert!(!session.snapshot().corrected.is_empty());

        let mut cleared = 0;
        for _ in 0..40 {
            if session.tick_core(0.05).corrected_cleared {
                cleared += 1;
            }
        }
        assert_eq!(cleared, 1);
        assert!(session.snapshot().corrected.is_empty());
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut session = AirwaysSession::with_config(SessionConfig::default());
        assert_eq!(session.tick_core(5.0).elapsed, 0.05);
        assert_eq!(session.tick_core(f64::NAN).elapsed, 0.05);
        assert_eq!(session.tick_core(-1.0).elapsed, 0.05);
    }
}
