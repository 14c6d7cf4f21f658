//! Asset dependency graph.
//!
//! This module builds the graph that every other computation reads:
//! - Graph construction from a flat list of asset definitions
//! - Cycle detection ([`has_cycle`]), the gate before any status or layout work
//! - Staleness propagation ([`compute_statuses`])
//!
//! # Graph Representation and Edge Direction Convention
//!
//! Nodes live in a `petgraph::DiGraph` arena; `node_map` maps each
//! [`NodeId`] to its `NodeIndex`. Edges point in the direction data flows:
//!
//! - **Edge source**: the upstream asset (the producer)
//! - **Edge target**: the downstream asset (the consumer)
//! - **Edge weight**: the downstream input name that consumes the upstream
//!
//! At most one edge exists per (upstream, downstream) pair. A later
//! dependency record for the same pair overwrites the input name of the
//! earlier one.
//!
//! Dependencies naming an upstream key that has no definition in the
//! snapshot are kept aside as [`DanglingDependency`] values and never become
//! edges, so they contribute nothing to cycle detection or staleness.

mod cycle;
mod staleness;

pub use cycle::has_cycle;
pub use staleness::{StatusMap, StatusSummary, compute_statuses};

use crate::domain::{AssetDefinition, AssetKey, NodeId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// A node of the asset graph: the asset's identity and its full definition.
#[derive(Debug, Clone)]
pub struct AssetNode {
    id: NodeId,
    definition: AssetDefinition,
}

impl AssetNode {
    /// Canonical identity of the node
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The asset definition this node was built from
    pub fn definition(&self) -> &AssetDefinition {
        &self.definition
    }

    /// The asset key
    pub fn key(&self) -> &AssetKey {
        &self.definition.asset_key
    }
}

/// A dependency whose upstream asset is not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    /// Asset that declared the dependency
    pub downstream: NodeId,
    /// Identity of the missing upstream asset
    pub upstream: NodeId,
    /// Input name of the dependency
    pub input_name: String,
}

/// Immutable asset dependency graph built from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct AssetGraph {
    /// Edge direction: source (upstream) -> target (downstream).
    graph: DiGraph<AssetNode, String>,

    /// Every node in `graph` has exactly one entry here.
    node_map: HashMap<NodeId, NodeIndex>,

    dangling: Vec<DanglingDependency>,
}

impl AssetGraph {
    /// Build the graph from asset definitions.
    ///
    /// Nodes are registered first so that dependencies may name assets that
    /// appear later in the list. If two definitions share a key, the later
    /// definition replaces the earlier one and the dependencies of both are
    /// kept.
    pub fn build<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = AssetDefinition>,
    {
        let mut graph: DiGraph<AssetNode, String> = DiGraph::new();
        let mut node_map: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut pending: Vec<(NodeId, NodeId, String)> = Vec::new();

        for definition in definitions {
            let id = definition.node_id();
            pending.extend(definition.dependencies.iter().map(|dep| {
                (
                    dep.upstream_asset_key.node_id(),
                    id.clone(),
                    dep.input_name.clone(),
                )
            }));

            if let Some(&index) = node_map.get(&id) {
                tracing::warn!(asset = %id, "Duplicate asset definition, keeping the later one");
                graph[index].definition = definition;
            } else {
                let index = graph.add_node(AssetNode {
                    id: id.clone(),
                    definition,
                });
                node_map.insert(id, index);
            }
        }

        let mut dangling = Vec::new();
        for (upstream, downstream, input_name) in pending {
            let (Some(&from), Some(&to)) = (node_map.get(&upstream), node_map.get(&downstream))
            else {
                tracing::debug!(
                    upstream = %upstream,
                    downstream = %downstream,
                    input = %input_name,
                    "Dependency on unknown asset, no edge added"
                );
                dangling.push(DanglingDependency {
                    downstream,
                    upstream,
                    input_name,
                });
                continue;
            };
            graph.update_edge(from, to, input_name);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling = dangling.len(),
            "Built asset graph"
        );

        Self {
            graph,
            node_map,
            dangling,
        }
    }

    /// Number of assets in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges in the graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no assets
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All nodes, in the order their keys were first seen.
    pub fn nodes(&self) -> impl Iterator<Item = &AssetNode> {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    /// Look up a node by identity.
    pub fn node(&self, id: &NodeId) -> Option<&AssetNode> {
        self.node_map.get(id).map(|&index| &self.graph[index])
    }

    /// Look up a node by asset key.
    ///
    /// # Errors
    ///
    /// Returns `Error::AssetNotFound` if no asset has this key.
    pub fn lookup(&self, key: &AssetKey) -> Result<&AssetNode> {
        self.node(&key.node_id())
            .ok_or_else(|| Error::AssetNotFound(key.display_path()))
    }

    /// Direct downstream assets of `id` with the consuming input name.
    ///
    /// Ordered by edge registration. Unknown ids yield an empty list.
    pub fn downstream(&self, id: &NodeId) -> Vec<(&NodeId, &str)> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Direct upstream assets of `id` with the consuming input name.
    ///
    /// Ordered by edge registration. Unknown ids yield an empty list.
    pub fn upstream(&self, id: &NodeId) -> Vec<(&NodeId, &str)> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &NodeId, direction: Direction) -> Vec<(&NodeId, &str)> {
        let Some(&index) = self.node_map.get(id) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self.graph.edges_directed(index, direction).collect();
        edges.sort_by_key(EdgeRef::id);
        edges
            .into_iter()
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (&self.graph[other].id, edge.weight().as_str())
            })
            .collect()
    }

    /// All edges as `(upstream, downstream, input name)`, in registration order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &str)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()].id,
                &self.graph[edge.target()].id,
                edge.weight().as_str(),
            )
        })
    }

    /// Dependencies that referenced assets missing from the snapshot
    pub fn dangling_dependencies(&self) -> &[DanglingDependency] {
        &self.dangling
    }

    /// The underlying petgraph arena.
    ///
    /// Exposed for callers that want petgraph's own algorithms.
    pub fn as_petgraph(&self) -> &DiGraph<AssetNode, String> {
        &self.graph
    }
}
