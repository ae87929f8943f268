// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Traffic Simulator

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::EngineError;
use crate::geometry::{bearing, interpolate, Projection};
use crate::registry::{ReroutePath, RouteRegistry};
use crate::types::{FlightStatus, FlightView, NodeCode, PairKey, RouteId, pair_key};

/// Smallest per-tick progress so flights never stall on long segments.
const MIN_STEP: f64 = 0.004;
const SPAWN_PHASE_MAX: f64 = 0.6;
const RESTART_PHASE_MAX: f64 = 0.2;
const SPEED_MIN: f64 = 0.85;
const SPEED_SPREAD: f64 = 0.25;

// ─── Binding ─────────────────────────────────────────────────────────────────

/// What a flight is flying. Only the scenario engine moves a flight between
/// these states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Binding {
    Bound { route: RouteId },
    Paused { original: RouteId },
    Rerouted { route: RouteId, original: RouteId },
}

impl Binding {
    /// Geometry the flight is drawn on.
    pub fn current(&self) -> &RouteId {
        match self {
            Self::Bound { route } | Self::Rerouted { route, .. } => route,
            Self::Paused { original } => original,
        }
    }

    pub fn original(&self) -> &RouteId {
        match self {
            Self::Bound { route } => route,
            Self::Paused { original } | Self::Rerouted { original, .. } => original,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    pub fn status(&self) -> FlightStatus {
        match self {
            Self::Bound { .. } => FlightStatus::Active,
            Self::Paused { .. } => FlightStatus::Paused,
            Self::Rerouted { .. } => FlightStatus::Rerouted,
        }
    }
}

// ─── Flight ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Flight {
    pub id: String,
    pub origin: NodeCode,
    pub destination: NodeCode,
    pub binding: Binding,
    /// Index of the current segment within the bound geometry.
    pub segment: usize,
    /// Fraction of the current segment covered, in [0, 1).
    pub t: f64,
    pub speed: f64,
}

impl Flight {
    pub fn key(&self) -> PairKey {
        pair_key(&self.origin, &self.destination)
    }

    /// Progress along a geometry of `points` points, in [0, 1).
    pub fn progress(&self, points: usize) -> f64 {
        if points < 2 {
            return 0.0;
        }
        ((self.segment as f64 + self.t) / (points - 1) as f64).clamp(0.0, 1.0 - f64::EPSILON)
    }

    fn rebind(&mut self, binding: Binding) {
        self.binding = binding;
        self.segment = 0;
        self.t = 0.0;
    }
}

// ─── TrafficSimulator ────────────────────────────────────────────────────────

pub struct TrafficSimulator {
    flights: Vec<Flight>,
    rng: ChaCha8Rng,
    max_flights: usize,
    base_speed: f64,
}

impl TrafficSimulator {
    /// `base_speed` is in projected units per second before the per-flight
    /// speed factor and the projection's zoom scale.
    pub fn new(rng: ChaCha8Rng, max_flights: usize, base_speed: f64) -> Self {
        Self { flights: Vec::new(), rng, max_flights, base_speed }
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn get(&self, id: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.id == id)
    }

    pub fn paused_count(&self) -> usize {
        self.flights.iter().filter(|f| f.binding.is_paused()).count()
    }

    /// Replaces every flight: the first `max_flights / 2` routes (rounded up)
    /// each get one flight per direction, capped at `max_flights`.
    pub fn populate(&mut self, registry: &RouteRegistry) {
        self.flights.clear();
        let sampled = self.max_flights / 2 + self.max_flights % 2;
        let mut next_id = 1;

        for route in registry.routes().take(sampled) {
            let legs = [
                (route.origin.clone(), route.destination.clone(), route.id.clone()),
                (
                    route.destination.clone(),
                    route.origin.clone(),
                    registry
                        .route_between(&route.destination, &route.origin)
                        .map(|r| r.id.clone())
                        .unwrap_or_else(|| route.id.clone()),
                ),
            ];
            for (origin, destination, id) in legs {
                if self.flights.len() >= self.max_flights {
                    break;
                }
                let flight = Flight {
                    id: format!("F{}", next_id),
                    origin,
                    destination,
                    binding: Binding::Bound { route: id },
                    segment: 0,
                    t: self.rng.gen::<f64>() * SPAWN_PHASE_MAX,
                    speed: SPEED_MIN + self.rng.gen::<f64>() * SPEED_SPREAD,
                };
                next_id += 1;
                self.flights.push(flight);
            }
        }
    }

    /// Pauses every bound or rerouted flight whose endpoints match a key.
    pub fn pause_matching(&mut self, keys: &HashSet<PairKey>) -> usize {
        let mut paused = 0;
        for flight in &mut self.flights {
            if flight.binding.is_paused() || !keys.contains(&flight.key()) {
                continue;
            }
            flight.binding = Binding::Paused { original: flight.binding.original().clone() };
            paused += 1;
        }
        paused
    }

    /// Resumes every paused flight on its original route.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for flight in &mut self.flights {
            if let Binding::Paused { original } = &flight.binding {
                flight.binding = Binding::Bound { route: original.clone() };
                released += 1;
            }
        }
        released
    }

    /// Moves paused flights matching `keys` onto the reroute serving their
    /// original origin and destination. Exact-direction paths are preferred
    /// over reversed ones. Paused flights outside `keys` resume on their
    /// original route. Returns the ids of flights left paused.
    pub fn apply_correction(&mut self, keys: &HashSet<PairKey>, reroutes: &[ReroutePath]) -> Vec<String> {
        let mut stranded = Vec::new();
        for flight in &mut self.flights {
            let Binding::Paused { original } = &flight.binding else {
                continue;
            };
            let original = original.clone();
            if !keys.contains(&flight.key()) {
                flight.binding = Binding::Bound { route: original };
                continue;
            }

            let serving = [false, true].iter().find_map(|&reversed| {
                reroutes
                    .iter()
                    .find_map(|r| r.serving(&flight.origin, &flight.destination, reversed))
            });
            match serving {
                Some(route) => {
                    let route = route.clone();
                    flight.rebind(Binding::Rerouted { route, original });
                }
                None => stranded.push(flight.id.clone()),
            }
        }
        stranded
    }

    /// Advances every flight by `dt` seconds and returns the render feed.
    /// Flights whose binding does not resolve are reported and left out.
    pub fn advance(
        &mut self,
        registry: &RouteRegistry,
        projection: &dyn Projection,
        dt: f64,
    ) -> (Vec<FlightView>, Vec<EngineError>) {
        let mut views = Vec::with_capacity(self.flights.len());
        let mut violations = Vec::new();
        let speed_scale = projection.speed_scale();

        for flight in &mut self.flights {
            let route_id = flight.binding.current();
            let Some(route) = registry.get(route_id) else {
                violations.push(EngineError::DanglingBinding {
                    flight: flight.id.clone(),
                    route: route_id.clone(),
                });
                continue;
            };
            let path = &route.coords;
            if path.len() < 2 {
                continue;
            }
            if flight.segment >= path.len() - 1 {
                flight.segment = 0;
            }

            if !flight.binding.is_paused() && dt > 0.0 {
                let a = path[flight.segment];
                let b = path[flight.segment + 1];
                let seg_len = projection.segment_length(a, b).max(1.0);
                let px_per_sec = self.base_speed * flight.speed * speed_scale;
                flight.t += (px_per_sec * dt / seg_len).max(MIN_STEP);

                while flight.t >= 1.0 {
                    flight.segment += 1;
                    flight.t -= 1.0;
                    if flight.segment >= path.len() - 1 {
                        flight.segment = 0;
                        flight.t = self.rng.gen::<f64>() * RESTART_PHASE_MAX;
                        break;
                    }
                }
            }

            let a = path[flight.segment];
            let b = path[flight.segment + 1];
            views.push(FlightView {
                id: flight.id.clone(),
                origin: flight.origin.clone(),
                destination: flight.destination.clone(),
                route: route.id.clone(),
                position: interpolate(a, b, flight.t),
                heading: bearing(a, b),
                progress: flight.progress(path.len()),
                status: flight.binding.status(),
            });
        }

        (views, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ArcStyle, GeometryProvider, WebMercator};
    use crate::network::NodeSet;
    use crate::types::{Node, RouteKind, RoutePair};
    use rand::SeedableRng;

    fn setup(max_flights: usize) -> (NodeSet, RouteRegistry, TrafficSimulator) {
        let nodes = NodeSet::from_nodes(vec![
            Node::new("A", "Alpha", 0.0, 0.0),
            Node::new("B", "Beta", 10.0, 0.0),
            Node::new("C", "Gamma", 5.0, 8.0),
        ]);
        let mut reg = RouteRegistry::new(GeometryProvider::new(10, ArcStyle::GreatCircle));
        reg.rebuild(&nodes, &[
            (RoutePair::new("A", "B"), RouteKind::Base),
            (RoutePair::new("B", "C"), RouteKind::Base),
        ]);
        let mut sim = TrafficSimulator::new(ChaCha8Rng::seed_from_u64(7), max_flights, 88.0);
        sim.populate(&reg);
        (nodes, reg, sim)
    }

    #[test]
    fn populate_spawns_both_directions_within_budget() {
        let (_, _, sim) = setup(16);
        assert_eq!(sim.flights().len(), 4);
        assert_eq!(sim.flights()[0].binding.current().0, "base:A-B");
        assert_eq!(sim.flights()[1].binding.current().0, "base:B-A");

        let (_, _, small) = setup(3);
        assert_eq!(small.flights().len(), 3);
    }

    #[test]
    fn spawn_phase_and_speed_ranges() {
        let (_, _, sim) = setup(16);
        for f in sim.flights() {
            assert!((0.0..SPAWN_PHASE_MAX).contains(&f.t));
            assert!((SPEED_MIN..SPEED_MIN + SPEED_SPREAD).contains(&f.speed));
        }
    }

    #[test]
    fn paused_flights_hold_position() {
        let (_, reg, mut sim) = setup(16);
        let keys: HashSet<_> = [RoutePair::new("B", "A").key()].into_iter().collect();
        assert_eq!(sim.pause_matching(&keys), 2);
        let before: Vec<(usize, f64)> = sim.flights().iter().map(|f| (f.segment, f.t)).collect();
        let proj = WebMercator::new(2.0);
        for _ in 0..50 {
            sim.advance(&reg, &proj, 0.05);
        }
        for (i, (f, (seg, t))) in sim.flights().iter().zip(before).enumerate() {
            if i < 2 {
                assert_eq!((f.segment, f.t), (seg, t));
            } else {
                assert_ne!((f.segment, f.t), (seg, t));
            }
        }
    }

    #[test]
    fn traversal_loops_back_to_start() {
        let (_, reg, mut sim) = setup(2);
        let proj = WebMercator::new(2.0);
        let mut wrapped = false;
        let mut last = sim.flights()[0].progress(11);
        for _ in 0..2000 {
            let (views, violations) = sim.advance(&reg, &proj, 0.05);
            assert!(violations.is_empty());
            let p = views[0].progress;
            assert!((0.0..1.0).contains(&p));
            if p < last {
                wrapped = true;
            }
            last = p;
        }
        assert!(wrapped);
    }

    #[test]
    fn correction_rebinds_and_reports_unmatched() {
        let (nodes, mut reg, mut sim) = setup(16);
        let keys: HashSet<_> = [RoutePair::new("A", "B").key()].into_iter().collect();
        sim.pause_matching(&keys);
        let rr = reg.install_reroute(&nodes, &["A".into(), "C".into(), "B".into()]).unwrap();

        let stranded = sim.apply_correction(&keys, &[rr.clone()]);
        assert!(stranded.is_empty());
        assert_eq!(sim.flights()[0].binding, Binding::Rerouted {
            route: rr.forward.clone(),
            original: RouteId("base:A-B".into()),
        });
        assert_eq!(sim.flights()[1].binding.current(), &rr.reverse);
        assert_eq!((sim.flights()[0].segment, sim.flights()[0].t), (0, 0.0));

        sim.pause_matching(&keys);
        let stranded = sim.apply_correction(&keys, &[]);
        assert_eq!(stranded, vec!["F1".to_string(), "F2".to_string()]);
        assert_eq!(sim.paused_count(), 2);
        assert_eq!(sim.release_all(), 2);
        assert_eq!(sim.flights()[0].binding, Binding::Bound { route: RouteId("base:A-B".into()) });
    }

    #[test]
    fn dangling_binding_is_reported() {
        let (nodes, mut reg, mut sim) = setup(16);
        reg.rebuild(&nodes, &[(RoutePair::new("B", "C"), RouteKind::Base)]);
        let (views, violations) = sim.advance(&reg, &WebMercator::new(2.0), 0.016);
        assert_eq!(views.len(), 2);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn heading_follows_segment_bearing() {
        let (_, reg, mut sim) = setup(16);
        let (views, _) = sim.advance(&reg, &WebMercator::new(2.0), 0.0);
        // A -> B runs due east along the equator.
        assert!((views[0].heading - 90.0).abs() < 1e-6);
        assert!((views[1].heading + 90.0).abs() < 1e-6);
    }

    #[test]
    fn positions_stay_on_route_across_antimeridian() {
        let nodes = NodeSet::from_nodes(vec![
            Node::new("W", "West", 170.0, 0.0),
            Node::new("E", "East", -170.0, 0.0),
        ]);
        let mut reg = RouteRegistry::new(GeometryProvider::new(4, ArcStyle::GreatCircle));
        reg.rebuild(&nodes, &[(RoutePair::new("W", "E"), RouteKind::Base)]);
        let mut sim = TrafficSimulator::new(ChaCha8Rng::seed_from_u64(3), 16, 88.0);
        sim.populate(&reg);

        let projection = WebMercator::new(2.0);
        for _ in 0..400 {
            let (views, violations) = sim.advance(&reg, &projection, 0.05);
            assert!(violations.is_empty());
            for v in &views {
                assert!(v.position.lon.abs() >= 170.0 - 1e-9, "{} at lon {}", v.id, v.position.lon);
                assert!(v.position.lon.abs() <= 180.0);
            }
        }
    }
}
