// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Route Registry

use std::collections::HashMap;

use crate::geometry::GeometryProvider;
use crate::network::NodeSet;
use crate::types::{Coordinate, NodeCode, Route, RouteId, RouteKind, RoutePair};

/// A reroute geometry installed during correction, stored in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReroutePath {
    pub forward: RouteId,
    pub reverse: RouteId,
    pub start: NodeCode,
    pub end: NodeCode,
}

impl ReroutePath {
    /// Route id carrying a flight from `origin` to `destination`, if this
    /// path connects them in either direction.
    pub fn serving(&self, origin: &NodeCode, destination: &NodeCode, reversed: bool) -> Option<&RouteId> {
        match reversed {
            false if &self.start == origin && &self.end == destination => Some(&self.forward),
            true if &self.start == destination && &self.end == origin => Some(&self.reverse),
            _ => None,
        }
    }
}

/// Materialized routes for the active topology plus the two highlight
/// overlays. Overlays never touch the base route set.
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    geometry: GeometryProvider,
    routes: HashMap<RouteId, Route>,
    /// Forward ids in build order; reverse entries are not listed.
    order: Vec<RouteId>,
    by_pair: HashMap<(NodeCode, NodeCode), RouteId>,
    reroutes: HashMap<RouteId, Route>,
    disrupted: Vec<Route>,
    corrected: Vec<Route>,
}

impl RouteRegistry {
    pub fn new(geometry: GeometryProvider) -> Self {
        Self {
            geometry,
            routes: HashMap::new(),
            order: Vec::new(),
            by_pair: HashMap::new(),
            reroutes: HashMap::new(),
            disrupted: Vec::new(),
            corrected: Vec::new(),
        }
    }

    /// Replaces every route and reroute. Pairs with a missing endpoint or a
    /// degenerate arc are skipped. Returns the number of routes built.
    pub fn rebuild(&mut self, nodes: &NodeSet, pairs: &[(RoutePair, RouteKind)]) -> usize {
        self.routes.clear();
        self.order.clear();
        self.by_pair.clear();
        self.reroutes.clear();

        for (pair, kind) in pairs {
            let (Some(a), Some(b)) = (nodes.get(&pair.0), nodes.get(&pair.1)) else {
                log::warn!("skipping {}-{}: endpoint not in network", pair.0, pair.1);
                continue;
            };
            let coords = self.geometry.arc(a, b);
            if coords.len() < 2 {
                log::debug!("skipping {}-{}: degenerate geometry", pair.0, pair.1);
                continue;
            }

            let forward = RouteId::new(*kind, &a.code, &b.code);
            let reverse = RouteId::new(*kind, &b.code, &a.code);
            let mut reversed = coords.clone();
            reversed.reverse();

            self.by_pair.insert((a.code.clone(), b.code.clone()), forward.clone());
            self.by_pair.insert((b.code.clone(), a.code.clone()), reverse.clone());
            self.routes.insert(reverse.clone(), Route {
                id: reverse,
                kind: *kind,
                origin: b.code.clone(),
                destination: a.code.clone(),
                coords: reversed,
            });
            self.routes.insert(forward.clone(), Route {
                id: forward.clone(),
                kind: *kind,
                origin: a.code.clone(),
                destination: b.code.clone(),
                coords,
            });
            self.order.push(forward);
        }

        log::info!("route registry rebuilt: {} routes", self.order.len());
        self.order.len()
    }

    /// Geometry from `origin` to `destination`, whichever direction was built.
    pub fn lookup(&self, origin: &NodeCode, destination: &NodeCode) -> Option<&[Coordinate]> {
        self.route_between(origin, destination).map(|r| r.coords.as_slice())
    }

    pub fn route_between(&self, origin: &NodeCode, destination: &NodeCode) -> Option<&Route> {
        self.by_pair
            .get(&(origin.clone(), destination.clone()))
            .and_then(|id| self.routes.get(id))
    }

    /// Base or reroute entry by id.
    pub fn get(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id).or_else(|| self.reroutes.get(id))
    }

    pub fn contains(&self, id: &RouteId) -> bool {
        self.get(id).is_some()
    }

    /// Active routes in build order, forward direction only.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.order.iter().filter_map(|id| self.routes.get(id))
    }

    pub fn route_ids(&self) -> Vec<RouteId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ─── Reroutes ────────────────────────────────────────────────────────────

    /// Concatenates the per-leg arcs of `path`, eliding the shared endpoint
    /// between consecutive legs. Legs that cannot be built are dropped; if
    /// that breaks the chain the whole path is discarded.
    pub fn install_reroute(&mut self, nodes: &NodeSet, path: &[NodeCode]) -> Option<ReroutePath> {
        let mut via: Vec<NodeCode> = Vec::new();
        let mut coords: Vec<Coordinate> = Vec::new();

        for leg in path.windows(2) {
            let (Some(a), Some(b)) = (nodes.get(&leg[0]), nodes.get(&leg[1])) else {
                log::warn!("reroute leg {}-{} dropped: endpoint not in network", leg[0], leg[1]);
                continue;
            };
            let arc = self.geometry.arc(a, b);
            if arc.len() < 2 {
                log::warn!("reroute leg {}-{} dropped: degenerate geometry", leg[0], leg[1]);
                continue;
            }
            match via.last() {
                None => {
                    via.push(a.code.clone());
                    coords.extend(arc);
                }
                Some(last) if last == &a.code => coords.extend(arc.into_iter().skip(1)),
                Some(_) => {
                    log::warn!("reroute {:?} discarded: dropped leg broke the chain", path);
                    return None;
                }
            }
            via.push(b.code.clone());
        }

        if via.len() < 2 {
            return None;
        }

        let forward = RouteId::for_path(RouteKind::Reroute, &via);
        let mut rev_via = via.clone();
        rev_via.reverse();
        let reverse = RouteId::for_path(RouteKind::Reroute, &rev_via);
        let start = via[0].clone();
        let end = via[via.len() - 1].clone();

        let mut reversed = coords.clone();
        reversed.reverse();
        self.reroutes.insert(reverse.clone(), Route {
            id: reverse.clone(),
            kind: RouteKind::Reroute,
            origin: end.clone(),
            destination: start.clone(),
            coords: reversed,
        });
        self.reroutes.insert(forward.clone(), Route {
            id: forward.clone(),
            kind: RouteKind::Reroute,
            origin: start.clone(),
            destination: end.clone(),
            coords,
        });

        Some(ReroutePath { forward, reverse, start, end })
    }

    // ─── Highlight Overlays ──────────────────────────────────────────────────

    pub fn set_disrupted(&mut self, nodes: &NodeSet, pairs: &[RoutePair]) {
        self.disrupted = self.overlay(nodes, pairs.iter().cloned(), RouteKind::Base);
    }

    /// One overlay entry per leg of each path.
    pub fn set_corrected(&mut self, nodes: &NodeSet, paths: &[Vec<NodeCode>], kind: RouteKind) {
        let legs: Vec<RoutePair> = paths
            .iter()
            .flat_map(|p| p.windows(2).map(|w| RoutePair(w[0].clone(), w[1].clone())))
            .collect();
        self.corrected = self.overlay(nodes, legs.into_iter(), kind);
    }

    pub fn clear_disrupted(&mut self) {
        self.disrupted.clear();
    }

    pub fn clear_corrected(&mut self) {
        self.corrected.clear();
    }

    pub fn disrupted(&self) -> &[Route] {
        &self.disrupted
    }

    pub fn corrected(&self) -> &[Route] {
        &self.corrected
    }

    fn overlay(
        &mut self,
        nodes: &NodeSet,
        pairs: impl Iterator<Item = RoutePair>,
        kind: RouteKind,
    ) -> Vec<Route> {
        pairs
            .filter_map(|pair| {
                let (a, b) = (nodes.get(&pair.0)?, nodes.get(&pair.1)?);
                let coords = self.geometry.arc(a, b);
                (coords.len() >= 2).then(|| Route {
                    id: RouteId::new(kind, &a.code, &b.code),
                    kind,
                    origin: a.code.clone(),
                    destination: b.code.clone(),
                    coords,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ArcStyle;
    use crate::types::Node;

    fn registry() -> RouteRegistry {
        RouteRegistry::new(GeometryProvider::new(16, ArcStyle::GreatCircle))
    }

    fn nodes() -> NodeSet {
        NodeSet::from_nodes(vec![
            Node::new("A", "Alpha", 0.0, 0.0),
            Node::new("B", "Beta", 10.0, 0.0),
            Node::new("C", "Gamma", 10.0, 10.0),
            Node::new("D", "Delta", 180.0, 0.0),
        ])
    }

    #[test]
    fn rebuild_stores_both_directions() {
        let mut reg = registry();
        let built = reg.rebuild(&nodes(), &[(RoutePair::new("A", "B"), RouteKind::Base)]);
        assert_eq!(built, 1);
        assert_eq!(reg.routes().count(), 1);
        let ab = reg.lookup(&"A".into(), &"B".into()).unwrap().to_vec();
        let mut ba = reg.lookup(&"B".into(), &"A".into()).unwrap().to_vec();
        ba.reverse();
        assert_eq!(ab, ba);
        assert!(reg.contains(&RouteId("base:B-A".into())));
    }

    #[test]
    fn degenerate_and_unknown_pairs_are_dropped() {
        let mut reg = registry();
        let pairs = [
            (RoutePair::new("A", "D"), RouteKind::Base), // antipodal
            (RoutePair::new("A", "Z"), RouteKind::Base),
            (RoutePair::new("B", "C"), RouteKind::Hub),
        ];
        assert_eq!(reg.rebuild(&nodes(), &pairs), 1);
        assert_eq!(reg.route_ids(), vec![RouteId("hub:B-C".into())]);
    }

    #[test]
    fn reroute_elides_shared_endpoint() {
        let mut reg = registry();
        let path: Vec<NodeCode> = vec!["A".into(), "B".into(), "C".into()];
        let rr = reg.install_reroute(&nodes(), &path).unwrap();
        assert_eq!(rr.forward.0, "reroute:A-B-C");
        assert_eq!(rr.reverse.0, "reroute:C-B-A");
        let route = reg.get(&rr.forward).unwrap();
        assert_eq!(route.coords.len(), 16 + 16 + 1);
        assert_eq!(reg.get(&rr.reverse).unwrap().coords.first(), route.coords.last());
        assert_eq!(rr.serving(&"C".into(), &"A".into(), true), Some(&rr.reverse));
        assert_eq!(rr.serving(&"C".into(), &"A".into(), false), None);
    }

    #[test]
    fn reroute_through_missing_node_is_discarded() {
        let mut reg = registry();
        let path: Vec<NodeCode> = vec!["A".into(), "X".into(), "B".into()];
        assert!(reg.install_reroute(&nodes(), &path).is_none());
        let broken: Vec<NodeCode> = vec!["A".into(), "B".into(), "X".into(), "C".into(), "B".into()];
        assert!(reg.install_reroute(&nodes(), &broken).is_none());
        let truncated: Vec<NodeCode> = vec!["A".into(), "B".into(), "X".into()];
        let rr = reg.install_reroute(&nodes(), &truncated).unwrap();
        assert_eq!((rr.start.as_str(), rr.end.as_str()), ("A", "B"));
    }

    #[test]
    fn overlays_do_not_touch_base_routes() {
        let mut reg = registry();
        let set = nodes();
        reg.rebuild(&set, &[(RoutePair::new("A", "B"), RouteKind::Base)]);
        reg.set_disrupted(&set, &[RoutePair::new("A", "B"), RoutePair::new("A", "Q")]);
        reg.set_corrected(&set, &[vec!["A".into(), "C".into(), "B".into()]], RouteKind::Reroute);
        assert_eq!(reg.disrupted().len(), 1);
        assert_eq!(reg.corrected().len(), 2);
        reg.clear_disrupted();
        reg.clear_corrected();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn rebuild_drops_reroutes() {
        let mut reg = registry();
        let set = nodes();
        let rr = reg.install_reroute(&set, &["A".into(), "C".into()]).unwrap();
        reg.rebuild(&set, &[]);
        assert!(!reg.contains(&rr.forward));
    }
}
