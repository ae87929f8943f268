// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator - Network Builder

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Node, NodeCode, RouteKind, RoutePair};

// ─── NodeSet ─────────────────────────────────────────────────────────────────

/// Airports in insertion order. Grows only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from trusted data, dropping malformed or duplicate entries.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut set = Self::new();
        for node in nodes {
            if let Err(e) = set.insert(node) {
                log::warn!("dropping airport: {}", e);
            }
        }
        set
    }

    pub fn insert(&mut self, node: Node) -> Result<(), ConfigError> {
        if node.code.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyCode);
        }
        if !node.coordinate().is_valid() {
            return Err(ConfigError::InvalidCoordinate {
                code: node.code.0.clone(),
                lon: node.lon,
                lat: node.lat,
            });
        }
        if self.contains(&node.code) {
            // Existing airports are immutable.
            return Ok(());
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, code: &NodeCode) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.code == code)
    }

    pub fn contains(&self, code: &NodeCode) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.nodes.clone()
    }
}

// ─── Pair Builders ───────────────────────────────────────────────────────────

/// Every unordered pair of distinct nodes, once, in insertion order.
pub fn all_to_all(nodes: &NodeSet) -> Vec<RoutePair> {
    let codes: Vec<&NodeCode> = nodes.iter().map(|n| &n.code).collect();
    let mut pairs = Vec::new();
    for (i, a) in codes.iter().enumerate() {
        for b in &codes[i + 1..] {
            pairs.push(RoutePair((*a).clone(), (*b).clone()));
        }
    }
    pairs
}

/// Every non-hub node paired with the hub. Empty when the hub is unknown.
pub fn hub_and_spoke(nodes: &NodeSet, hub: &NodeCode) -> Vec<RoutePair> {
    if !nodes.contains(hub) {
        return Vec::new();
    }
    nodes
        .iter()
        .filter(|n| &n.code != hub)
        .map(|n| RoutePair(n.code.clone(), hub.clone()))
        .collect()
}

/// The pairs whose endpoints both exist, de-duplicated, order preserved.
pub fn curated(nodes: &NodeSet, pairs: &[RoutePair]) -> Vec<RoutePair> {
    dedup(pairs.iter().filter(|p| nodes.contains(&p.0) && nodes.contains(&p.1)).cloned())
}

/// Pass-through de-duplicated by unordered key.
pub fn explicit_pairs(pairs: &[RoutePair]) -> Vec<RoutePair> {
    dedup(pairs.iter().cloned())
}

/// First occurrence of each unordered key wins; self-pairs are discarded.
pub fn dedup(pairs: impl IntoIterator<Item = RoutePair>) -> Vec<RoutePair> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|p| !p.is_loop() && seen.insert(p.key()))
        .collect()
}

// ─── Topology ────────────────────────────────────────────────────────────────

/// Rule generating the active route set from the node set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Topology {
    AllToAll,
    HubAndSpoke { hub: NodeCode },
    Curated { pairs: Vec<RoutePair> },
    Explicit { pairs: Vec<RoutePair> },
    /// Spokes to the hub first, then showpiece corridors.
    HubWithCorridors { hub: NodeCode, corridors: Vec<RoutePair> },
}

impl Topology {
    pub fn hub(&self) -> Option<&NodeCode> {
        match self {
            Self::HubAndSpoke { hub } | Self::HubWithCorridors { hub, .. } => Some(hub),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::AllToAll => "all-to-all".to_string(),
            Self::HubAndSpoke { hub } => format!("hub {}", hub),
            Self::Curated { .. } => "curated".to_string(),
            Self::Explicit { .. } => "explicit".to_string(),
            Self::HubWithCorridors { hub, .. } => format!("hub {} + corridors", hub),
        }
    }

    /// Active pairs with their route kind, de-duplicated.
    pub fn build(&self, nodes: &NodeSet) -> Vec<(RoutePair, RouteKind)> {
        let tagged: Vec<(RoutePair, RouteKind)> = match self {
            Self::AllToAll => tag(all_to_all(nodes), RouteKind::Base),
            Self::HubAndSpoke { hub } => tag(hub_and_spoke(nodes, hub), RouteKind::Hub),
            Self::Curated { pairs } => tag(curated(nodes, pairs), RouteKind::Base),
            Self::Explicit { pairs } => tag(explicit_pairs(pairs), RouteKind::Base),
            Self::HubWithCorridors { hub, corridors } => {
                let mut out = tag(hub_and_spoke(nodes, hub), RouteKind::Hub);
                out.extend(tag(curated(nodes, corridors), RouteKind::Base));
                out
            }
        };
        dedup_tagged(tagged)
    }
}

fn tag(pairs: Vec<RoutePair>, kind: RouteKind) -> Vec<(RoutePair, RouteKind)> {
    pairs.into_iter().map(|p| (p, kind)).collect()
}

pub fn dedup_tagged(
    pairs: impl IntoIterator<Item = (RoutePair, RouteKind)>,
) -> Vec<(RoutePair, RouteKind)> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|(p, _)| !p.is_loop() && seen.insert(p.key()))
        .collect()
}
