// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Operations Dashboard

use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::path_length_km;
use crate::network::NodeSet;
use crate::registry::RouteRegistry;
use crate::traffic::TrafficSimulator;
use crate::types::NodeCode;

// Ops assumptions for the dashboard figures.
const AIRCRAFT_CAPACITY_TONS: f64 = 18.0;
const AIRSPEED_KMPH: f64 = 870.0;
const FUEL_BURN_KG_PER_KM: f64 = 3.1;

/// One dashboard row. A flight counts towards both of its endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AirportStats {
    pub code: NodeCode,
    pub name: String,
    pub flights: u32,
    pub active: u32,
    pub paused: u32,
    pub tonnage_t: f64,
    pub time_h: f64,
    pub fuel_t: f64,
}

pub fn dashboard(nodes: &NodeSet, traffic: &TrafficSimulator, registry: &RouteRegistry) -> Vec<AirportStats> {
    let mut rows: Vec<AirportStats> = nodes
        .iter()
        .map(|n| AirportStats { code: n.code.clone(), name: n.name.clone(), ..Default::default() })
        .collect();
    let index: HashMap<NodeCode, usize> =
        rows.iter().enumerate().map(|(i, r)| (r.code.clone(), i)).collect();

    for flight in traffic.flights() {
        let (Some(&a), Some(&b)) = (index.get(&flight.origin), index.get(&flight.destination)) else {
            continue;
        };
        let paused = flight.binding.is_paused();
        let dist_km = if paused {
            0.0
        } else {
            registry.get(flight.binding.current()).map_or(0.0, |r| path_length_km(&r.coords))
        };

        for i in [a, b] {
            let row = &mut rows[i];
            row.flights += 1;
            if paused {
                row.paused += 1;
                continue;
            }
            row.active += 1;
            row.tonnage_t += AIRCRAFT_CAPACITY_TONS;
            row.time_h += dist_km / AIRSPEED_KMPH;
            row.fuel_t += FUEL_BURN_KG_PER_KM * dist_km / 1000.0;
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use crate::config::SessionConfig;
    use crate::scenario::ScenarioTrack;
    use crate::session::{AirwaysSession, Command};

    #[test]
    fn paused_flights_carry_no_load() {
        let mut session = AirwaysSession::with_config(SessionConfig::default());
        session.dispatch(Command::Disrupt { track: ScenarioTrack::Routes });

        let rows = session.stats_core();
        let lon = rows.iter().find(|r| r.code.as_str() == "LON").unwrap();
        // LON-NYC flights are paused, LON-FRA is outside the flight budget.
        assert_eq!((lon.flights, lon.paused, lon.active), (2, 2, 0));
        assert_eq!(lon.tonnage_t, 0.0);

        let fra = rows.iter().find(|r| r.code.as_str() == "FRA").unwrap();
        assert_eq!((fra.flights, fra.active), (4, 4));
        assert_eq!(fra.tonnage_t, 4.0 * 18.0);
        assert!(fra.time_h > 0.0 && fra.fuel_t > 0.0);
    }
}
