// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Network Presets

use crate::network::Topology;
use crate::scenario::{AirportBlock, RouteScenario, ScenarioBook};
use crate::types::{Node, NodeCode, RoutePair};

pub const HUB: &str = "DXB";

// ─── Airports ────────────────────────────────────────────────────────────────

const BASE_AIRPORTS: [(&str, &str, f64, f64); 13] = [
    ("DXB", "Dubai", 55.2708, 25.2048),
    ("FRA", "Frankfurt", 8.6821, 50.1109),
    ("LON", "London", -0.1276, 51.5072),
    ("ROM", "Rome", 12.4964, 41.9028),
    ("NYC", "New York", -74.0060, 40.7128),
    ("CHI", "Chicago", -87.6298, 41.8781),
    ("HKG", "Hong Kong", 114.1694, 22.3193),
    ("TYO", "Tokyo", 139.6917, 35.6895),
    ("MOW", "Moscow", 37.6173, 55.7558),
    ("KBL", "Kabul", 69.2075, 34.5553),
    ("DEL", "New Delhi", 77.2090, 28.6139),
    ("THR", "Tehran", 51.3890, 35.6892),
    ("CCS", "Caracas", -66.9036, 10.4806),
];

const OPTIONAL_AIRPORTS: [(&str, &str, f64, f64); 2] = [
    ("PAR", "Paris", 2.3522, 48.8566),
    ("VIE", "Vienna", 16.3738, 48.2082),
];

pub fn base_nodes() -> Vec<Node> {
    BASE_AIRPORTS.iter().map(|&(c, n, lon, lat)| Node::new(c, n, lon, lat)).collect()
}

pub fn optional_airports() -> Vec<Node> {
    OPTIONAL_AIRPORTS.iter().map(|&(c, n, lon, lat)| Node::new(c, n, lon, lat)).collect()
}

// ─── Corridors ───────────────────────────────────────────────────────────────

const NORMAL_CORRIDORS: [(&str, &str); 15] = [
    ("LON", "NYC"),
    ("FRA", "ROM"),
    ("HKG", "TYO"),
    ("NYC", "CHI"),
    ("FRA", "MOW"),
    ("DEL", "KBL"),
    ("DEL", "DXB"),
    ("ROM", "DXB"),
    ("FRA", "LON"),
    ("DEL", "HKG"),
    ("MOW", "THR"),
    ("THR", "KBL"),
    ("THR", "DEL"),
    ("CCS", "NYC"),
    ("CCS", "ROM"),
];

const HUB_CORRIDORS: [(&str, &str); 8] = [
    ("LON", "NYC"),
    ("FRA", "ROM"),
    ("HKG", "TYO"),
    ("NYC", "CHI"),
    ("FRA", "LON"),
    ("DEL", "HKG"),
    ("THR", "DEL"),
    ("CCS", "NYC"),
];

fn pairs(table: &[(&str, &str)]) -> Vec<RoutePair> {
    table.iter().map(|&(a, b)| RoutePair::new(a, b)).collect()
}

fn path(codes: &[&str]) -> Vec<NodeCode> {
    codes.iter().map(|&c| NodeCode::from(c)).collect()
}

/// Baseline network: curated corridors, no hub.
pub fn normal_topology() -> Topology {
    Topology::Curated { pairs: pairs(&NORMAL_CORRIDORS) }
}

/// Hub-and-spoke around `hub` plus the showpiece corridors.
pub fn hub_topology(hub: &str) -> Topology {
    Topology::HubWithCorridors { hub: hub.into(), corridors: pairs(&HUB_CORRIDORS) }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

pub fn scenario_book() -> ScenarioBook {
    ScenarioBook { routes: route_scenarios(), airports: airport_blocks() }
}

fn route_scenarios() -> Vec<RouteScenario> {
    vec![
        RouteScenario {
            name: "North Atlantic jetstream turbulence".into(),
            disrupt_pairs: pairs(&[("LON", "NYC")]),
            correction_paths: vec![path(&["LON", "FRA", "NYC"]), path(&["NYC", "CHI", "LON"])],
            disrupt_narration: "Disruption detected. North Atlantic turbulence is forcing capacity \
                reductions on the London to New York corridor. Impacted flights are paused."
                .into(),
            correct_narration: "Correction applied. Flights are rerouted via Frankfurt and Chicago \
                to stabilize flow and maintain service levels."
                .into(),
        },
        RouteScenario {
            name: "Gulf airspace constraint".into(),
            disrupt_pairs: pairs(&[("DXB", "HKG"), ("DXB", "LON")]),
            correction_paths: vec![path(&["DXB", "ROM", "LON"]), path(&["DXB", "TYO", "HKG"])],
            disrupt_narration: "Disruption detected. Gulf airspace constraints are affecting Dubai \
                links to London and Hong Kong. Impacted flights are paused."
                .into(),
            correct_narration: "Correction applied. Rerouting via Rome and Tokyo to preserve \
                connectivity while avoiding constrained corridors."
                .into(),
        },
        RouteScenario {
            name: "East Asia corridor congestion".into(),
            disrupt_pairs: pairs(&[("HKG", "TYO")]),
            correction_paths: vec![path(&["HKG", "DXB", "TYO"])],
            disrupt_narration: "Disruption detected. East Asia corridor congestion is rising \
                between Hong Kong and Tokyo. Affected flights are paused."
                .into(),
            correct_narration: "Correction applied. Routing via Dubai to smooth congestion and \
                restore network balance."
                .into(),
        },
    ]
}

fn block(
    name: &str,
    code: &str,
    affected: &[(&str, &str)],
    bypass: &[(&str, &str)],
    narration: &str,
) -> AirportBlock {
    AirportBlock {
        name: name.into(),
        block: code.into(),
        affected_pairs: pairs(affected),
        bypass_pairs: pairs(bypass),
        disrupt_narration: narration.into(),
        correct_narration: format!("Airport correction applied. {} is back in the network.", code),
    }
}

fn airport_blocks() -> Vec<AirportBlock> {
    vec![
        block(
            "Iran airspace closure (bypass Tehran)",
            "THR",
            &[("MOW", "THR"), ("THR", "KBL"), ("THR", "DEL")],
            &[("MOW", "KBL"), ("MOW", "DEL"), ("KBL", "DEL")],
            "Country disruption detected. Tehran is unavailable. Flights are rerouted to bypass \
             Tehran while preserving Moscow, Kabul, and New Delhi connectivity.",
        ),
        block(
            "Venezuela airport disruption (bypass Caracas)",
            "CCS",
            &[("CCS", "NYC"), ("CCS", "ROM")],
            &[("NYC", "ROM")],
            "Country disruption detected. Caracas is unavailable. Connectivity is preserved by \
             rerouting transatlantic flow directly between New York and Rome.",
        ),
        block(
            "Afghanistan constraint (bypass Kabul)",
            "KBL",
            &[("DEL", "KBL"), ("THR", "KBL")],
            &[("DEL", "THR"), ("DEL", "MOW")],
            "Country disruption detected. Kabul is unavailable. New Delhi and Tehran remain \
             connected, with alternate links added to preserve regional reach.",
        ),
        block(
            "Hong Kong capacity restriction (bypass Hong Kong)",
            "HKG",
            &[("DEL", "HKG"), ("HKG", "TYO")],
            &[("DEL", "TYO")],
            "Country disruption detected. Hong Kong is constrained. Network remains stable by \
             connecting New Delhi directly to Tokyo, bypassing Hong Kong.",
        ),
        block(
            "Frankfurt strike (bypass Frankfurt)",
            "FRA",
            &[("FRA", "ROM"), ("FRA", "LON"), ("FRA", "MOW")],
            &[("LON", "ROM"), ("LON", "MOW")],
            "Country disruption detected. Frankfurt is unavailable. London becomes the bridging \
             point to preserve Rome and Moscow connectivity.",
        ),
        block(
            "Dubai slot disruption (bypass Dubai)",
            "DXB",
            &[("DEL", "DXB"), ("ROM", "DXB")],
            &[("DEL", "ROM")],
            "Country disruption detected. Dubai is constrained. Network remains connected via a \
             direct New Delhi to Rome corridor.",
        ),
    ]
}
