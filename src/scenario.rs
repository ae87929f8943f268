// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Scenario Engine

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::registry::ReroutePath;
use crate::session::World;
use crate::types::{NodeCode, PairKey, RouteKind, RoutePair};

// ─── Scenario Definitions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTrack {
    /// Corridor disruptions: flights pause, correction reroutes them.
    Routes,
    /// Airport closures: the network is rebuilt around the blocked airport.
    Airports,
}

impl fmt::Display for ScenarioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Routes => write!(f, "route"),
            Self::Airports => write!(f, "airport"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteScenario {
    pub name: String,
    pub disrupt_pairs: Vec<RoutePair>,
    /// Multi-hop replacement paths, each at least two airports long.
    pub correction_paths: Vec<Vec<NodeCode>>,
    pub disrupt_narration: String,
    pub correct_narration: String,
}

impl RouteScenario {
    pub fn keys(&self) -> HashSet<PairKey> {
        self.disrupt_pairs.iter().map(RoutePair::key).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportBlock {
    pub name: String,
    pub block: NodeCode,
    pub affected_pairs: Vec<RoutePair>,
    /// Direct links keeping the remaining airports connected.
    pub bypass_pairs: Vec<RoutePair>,
    pub disrupt_narration: String,
    pub correct_narration: String,
}

impl AirportBlock {
    pub fn bypass_paths(&self) -> Vec<Vec<NodeCode>> {
        self.bypass_pairs.iter().map(|p| vec![p.0.clone(), p.1.clone()]).collect()
    }
}

/// Read-only scenario tables, one ordered list per track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBook {
    #[serde(default)]
    pub routes: Vec<RouteScenario>,
    #[serde(default)]
    pub airports: Vec<AirportBlock>,
}

impl ScenarioBook {
    pub fn len(&self, track: ScenarioTrack) -> usize {
        match track {
            ScenarioTrack::Routes => self.routes.len(),
            ScenarioTrack::Airports => self.airports.len(),
        }
    }

    pub fn name(&self, track: ScenarioTrack, index: usize) -> Option<&str> {
        match track {
            ScenarioTrack::Routes => self.routes.get(index).map(|s| s.name.as_str()),
            ScenarioTrack::Airports => self.airports.get(index).map(|s| s.name.as_str()),
        }
    }
}

// ─── Engine State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Normal,
    Disrupted { track: ScenarioTrack, index: usize },
    /// Only observable while a correction is being applied.
    Correcting { track: ScenarioTrack, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub scenario: String,
    pub narration: String,
    pub superseded: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub scenario: String,
    pub narration: String,
    pub stranded: Vec<String>,
}

// ─── ScenarioEngine ──────────────────────────────────────────────────────────

/// Cycles through the scenario tables and applies their effects to the
/// world. At most one scenario is active; a new disruption supersedes the
/// active one after clearing its effects.
pub struct ScenarioEngine {
    book: ScenarioBook,
    route_cursor: Option<usize>,
    airport_cursor: Option<usize>,
    state: EngineState,
}

impl ScenarioEngine {
    pub fn new(book: ScenarioBook) -> Self {
        Self { book, route_cursor: None, airport_cursor: None, state: EngineState::Normal }
    }

    pub fn book(&self) -> &ScenarioBook {
        &self.book
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn active_name(&self) -> Option<&str> {
        match self.state {
            EngineState::Normal => None,
            EngineState::Disrupted { track, index } | EngineState::Correcting { track, index } => {
                self.book.name(track, index)
            }
        }
    }

    /// Active airport closure, if any. Topology rebuilds must honour it.
    pub fn active_block(&self) -> Option<&AirportBlock> {
        match self.state {
            EngineState::Disrupted { track: ScenarioTrack::Airports, index } => self.book.airports.get(index),
            _ => None,
        }
    }

    fn advance(&mut self, track: ScenarioTrack) -> usize {
        let len = self.book.len(track);
        let cursor = match track {
            ScenarioTrack::Routes => &mut self.route_cursor,
            ScenarioTrack::Airports => &mut self.airport_cursor,
        };
        let next = cursor.map_or(0, |c| (c + 1) % len);
        *cursor = Some(next);
        next
    }

    pub fn disrupt(&mut self, world: &mut World, track: ScenarioTrack) -> Result<Transition, CommandError> {
        if self.book.len(track) == 0 {
            return Err(CommandError::NoScenarios(track));
        }
        let superseded = self.lift(world);
        let index = self.advance(track);

        let (scenario, narration) = match track {
            ScenarioTrack::Routes => {
                let s = &self.book.routes[index];
                world.registry.set_disrupted(&world.nodes, &s.disrupt_pairs);
                world.registry.clear_corrected();
                let paused = world.traffic.pause_matching(&s.keys());
                log::info!("disruption '{}': {} flights paused", s.name, paused);
                (s.name.clone(), s.disrupt_narration.clone())
            }
            ScenarioTrack::Airports => {
                let s = &self.book.airports[index];
                let routes = world.rebuild(Some(s));
                world.registry.set_disrupted(&world.nodes, &s.affected_pairs);
                world.registry.set_corrected(&world.nodes, &s.bypass_paths(), RouteKind::Bypass);
                log::info!("airport closure '{}': {} bypassing, {} routes", s.name, s.block, routes);
                (s.name.clone(), s.disrupt_narration.clone())
            }
        };

        self.state = EngineState::Disrupted { track, index };
        Ok(Transition { scenario, narration, superseded })
    }

    pub fn correct(&mut self, world: &mut World) -> Result<Correction, CommandError> {
        let EngineState::Disrupted { track, index } = self.state else {
            return Err(CommandError::NothingToCorrect);
        };
        self.state = EngineState::Correcting { track, index };

        let correction = match track {
            ScenarioTrack::Routes => {
                let s = &self.book.routes[index];
                let reroutes: Vec<ReroutePath> = s
                    .correction_paths
                    .iter()
                    .filter_map(|path| world.registry.install_reroute(&world.nodes, path))
                    .collect();
                let stranded = world.traffic.apply_correction(&s.keys(), &reroutes);
                world.registry.clear_disrupted();
                world.registry.set_corrected(&world.nodes, &s.correction_paths, RouteKind::Reroute);
                if stranded.is_empty() {
                    log::info!("correction '{}': {} reroutes installed", s.name, reroutes.len());
                } else {
                    log::warn!("partial correction '{}': {} flights left paused", s.name, stranded.len());
                }
                Correction {
                    scenario: s.name.clone(),
                    narration: s.correct_narration.clone(),
                    stranded,
                }
            }
            ScenarioTrack::Airports => {
                let s = &self.book.airports[index];
                world.rebuild(None);
                world.registry.clear_disrupted();
                world.registry.set_corrected(&world.nodes, &s.bypass_paths(), RouteKind::Bypass);
                log::info!("correction '{}': {} restored", s.name, s.block);
                Correction {
                    scenario: s.name.clone(),
                    narration: s.correct_narration.clone(),
                    stranded: Vec::new(),
                }
            }
        };

        self.state = EngineState::Normal;
        Ok(correction)
    }

    /// Drops the active scenario and all of its effects except the topology,
    /// which the caller rebuilds.
    pub fn reset(&mut self, world: &mut World) {
        self.state = EngineState::Normal;
        world.traffic.release_all();
        world.registry.clear_disrupted();
        world.registry.clear_corrected();
    }

    /// Clears the active scenario's effects, restoring the base topology
    /// after an airport closure. Returns the lifted scenario's name.
    fn lift(&mut self, world: &mut World) -> Option<String> {
        let EngineState::Disrupted { track, index } = self.state else {
            return None;
        };
        let name = self.book.name(track, index).map(str::to_string);
        self.reset(world);
        if track == ScenarioTrack::Airports {
            world.rebuild(None);
        }
        log::info!("superseding '{}'", name.as_deref().unwrap_or("?"));
        name
    }
}
