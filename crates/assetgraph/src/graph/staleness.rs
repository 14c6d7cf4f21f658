//! Staleness propagation.
//!
//! Computes an [`AssetStatus`] for every asset by comparing materialization
//! timestamps along upstream edges.
//!
//! # Algorithm
//!
//! 1. Collect each node's latest materialization timestamp (`0.0` if none)
//! 2. Invert the adjacency: direct upstream nodes per node, in edge order
//! 3. Nodes that were never materialized resolve to `none` up front
//! 4. Every other node resolves through a memo table:
//!    - any direct upstream strictly newer than the node: `old`
//!    - otherwise any direct upstream whose own status is not `good`:
//!      `downstream-from-old`
//!    - otherwise `good`
//!
//! The classification is order-independent: "some upstream is newer" wins
//! over everything, and "some upstream is not good" wins over `good`.
//!
//! # Cycles
//!
//! Callers gate on [`super::has_cycle`] first. If a cycle slips through, the
//! propagation still terminates: a node met again while it is being resolved
//! is skipped when deciding `downstream-from-old`. The statuses of nodes on
//! such a cycle carry no meaning.

use super::AssetGraph;
use crate::domain::{AssetStatus, NodeId};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Status of every asset, keyed by node identity.
pub type StatusMap = HashMap<NodeId, AssetStatus>;

/// Compute the freshness status of every asset in an acyclic graph.
pub fn compute_statuses(graph: &AssetGraph) -> StatusMap {
    let g = graph.as_petgraph();
    let count = g.node_count();

    let timestamps: Vec<f64> = g
        .node_indices()
        .map(|index| g[index].definition().latest_timestamp())
        .collect();

    let mut upstream: Vec<Vec<NodeIndex>> = vec![Vec::new(); count];
    for edge in g.edge_references() {
        upstream[edge.target().index()].push(edge.source());
    }

    let mut memo: Vec<Option<AssetStatus>> = g
        .node_indices()
        .map(|index| {
            (!g[index].definition().is_materialized()).then_some(AssetStatus::Unmaterialized)
        })
        .collect();

    let mut propagation = Propagation {
        timestamps: &timestamps,
        upstream: &upstream,
        memo: &mut memo,
        in_progress: vec![false; count],
    };
    for root in g.node_indices() {
        propagation.resolve(root);
    }

    g.node_indices()
        .zip(memo)
        .filter_map(|(index, status)| status.map(|s| (g[index].id().clone(), s)))
        .collect()
}

/// Memoized resolution state for one `compute_statuses` call.
struct Propagation<'a> {
    timestamps: &'a [f64],
    upstream: &'a [Vec<NodeIndex>],
    memo: &'a mut [Option<AssetStatus>],
    in_progress: Vec<bool>,
}

impl Propagation<'_> {
    /// Resolve `root` and every upstream node it needs.
    ///
    /// Each stack frame is `(node, next upstream position)`.
    fn resolve(&mut self, root: NodeIndex) {
        if self.memo[root.index()].is_some() {
            return;
        }

        self.in_progress[root.index()] = true;
        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];

        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;

            if *cursor == 0 && self.has_newer_upstream(node) {
                self.finish(node, AssetStatus::Old);
                stack.pop();
                continue;
            }

            if let Some(&up) = self.upstream[node.index()].get(*cursor) {
                *cursor += 1;
                if self.memo[up.index()].is_none() && !self.in_progress[up.index()] {
                    self.in_progress[up.index()] = true;
                    stack.push((up, 0));
                }
                continue;
            }

            let status = if self.has_unhealthy_upstream(node) {
                AssetStatus::DownstreamFromOld
            } else {
                AssetStatus::Good
            };
            self.finish(node, status);
            stack.pop();
        }
    }

    fn has_newer_upstream(&self, node: NodeIndex) -> bool {
        let own = self.timestamps[node.index()];
        self.upstream[node.index()]
            .iter()
            .any(|up| self.timestamps[up.index()] > own)
    }

    /// Upstream nodes still in progress (only possible on a cycle) are skipped.
    fn has_unhealthy_upstream(&self, node: NodeIndex) -> bool {
        self.upstream[node.index()]
            .iter()
            .any(|up| matches!(self.memo[up.index()], Some(status) if !status.is_good()))
    }

    fn finish(&mut self, node: NodeIndex, status: AssetStatus) {
        self.memo[node.index()] = Some(status);
        self.in_progress[node.index()] = false;
    }
}

/// Count of assets per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatusSummary {
    /// Assets that are `good`
    pub good: usize,
    /// Assets that are `old`
    pub old: usize,
    /// Assets that are `downstream-from-old`
    pub downstream_from_old: usize,
    /// Assets that were never materialized
    #[serde(rename = "none")]
    pub unmaterialized: usize,
}

impl StatusSummary {
    /// Tally a status map
    pub fn from_statuses(statuses: &StatusMap) -> Self {
        statuses
            .values()
            .fold(Self::default(), |mut summary, status| {
                match status {
                    AssetStatus::Good => summary.good += 1,
                    AssetStatus::Old => summary.old += 1,
                    AssetStatus::DownstreamFromOld => summary.downstream_from_old += 1,
                    AssetStatus::Unmaterialized => summary.unmaterialized += 1,
                }
                summary
            })
    }

    /// Total number of assets counted
    pub fn total(&self) -> usize {
        self.good + self.old + self.downstream_from_old + self.unmaterialized
    }

    /// Count for a single status
    pub fn count(&self, status: AssetStatus) -> usize {
        match status {
            AssetStatus::Good => self.good,
            AssetStatus::Old => self.old,
            AssetStatus::DownstreamFromOld => self.downstream_from_old,
            AssetStatus::Unmaterialized => self.unmaterialized,
        }
    }
}
