//! Cycle detection for asset graphs.
//!
//! Depth-first search from every node that earlier searches have not
//! already explored. A cycle exists exactly when the search meets a node
//! that is still on the current search path (a back edge); edges into nodes
//! finished by an earlier search are cross or forward edges and are ignored.
//!
//! The search keeps its own stack of `(node, remaining children)` frames, so
//! long dependency chains cost heap, not call stack.

use super::{AssetGraph, AssetNode};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Whether the asset graph contains any directed cycle.
///
/// Stops at the first back edge found. Self-dependencies count as cycles.
pub fn has_cycle(graph: &AssetGraph) -> bool {
    let found = find_back_edge(graph.as_petgraph());
    if let Some((from, to)) = found {
        let g = graph.as_petgraph();
        tracing::info!(
            from = %g[from].id(),
            to = %g[to].id(),
            "Cycle detected in asset graph"
        );
    }
    found.is_some()
}

/// Returns the first back edge `(from, to)` encountered, if any.
fn find_back_edge(g: &DiGraph<AssetNode, String>) -> Option<(NodeIndex, NodeIndex)> {
    let mut explored = vec![false; g.node_count()];
    let mut on_path = vec![false; g.node_count()];

    for root in g.node_indices() {
        if explored[root.index()] {
            continue;
        }

        on_path[root.index()] = true;
        let mut stack = vec![(root, g.neighbors_directed(root, Direction::Outgoing))];

        while let Some((node, children)) = stack.last_mut() {
            let node = *node;
            match children.next() {
                Some(child) if on_path[child.index()] => return Some((node, child)),
                Some(child) => {
                    if !explored[child.index()] {
                        on_path[child.index()] = true;
                        stack.push((child, g.neighbors_directed(child, Direction::Outgoing)));
                    }
                }
                None => {
                    on_path[node.index()] = false;
                    explored[node.index()] = true;
                    stack.pop();
                }
            }
        }
    }

    None
}
