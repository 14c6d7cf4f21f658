//! The build, gate, propagate pipeline.
//!
//! [`Analysis::run`] builds the graph from one snapshot, checks it for
//! cycles and only computes statuses when the graph is acyclic. A cyclic
//! analysis carries the graph but no statuses, so nothing downstream can
//! lay it out or color it by accident.

use crate::domain::AssetDefinition;
use crate::error::{Error, Result};
use crate::graph::{AssetGraph, StatusMap, StatusSummary, compute_statuses, has_cycle};
use crate::layout::{LayoutEngine, LayoutRequest, NodeSizing, RenderModel};

/// Result of analyzing one snapshot.
#[derive(Debug, Clone)]
pub enum Analysis {
    /// The graph has a cycle; statuses and layout are undefined.
    Cyclic {
        /// The graph as built
        graph: AssetGraph,
    },

    /// The graph is a DAG and every asset has a status.
    Acyclic {
        /// The graph as built
        graph: AssetGraph,
        /// Status of every asset
        statuses: StatusMap,
    },
}

impl Analysis {
    /// Build, gate and propagate.
    pub fn run<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = AssetDefinition>,
    {
        let graph = AssetGraph::build(definitions);
        if has_cycle(&graph) {
            return Analysis::Cyclic { graph };
        }

        let statuses = compute_statuses(&graph);
        tracing::debug!(assets = statuses.len(), "Computed asset statuses");
        Analysis::Acyclic { graph, statuses }
    }

    /// The graph, whether or not it is cyclic
    pub fn graph(&self) -> &AssetGraph {
        match self {
            Analysis::Cyclic { graph } | Analysis::Acyclic { graph, .. } => graph,
        }
    }

    /// Statuses, or `None` when the graph is cyclic
    pub fn statuses(&self) -> Option<&StatusMap> {
        match self {
            Analysis::Cyclic { .. } => None,
            Analysis::Acyclic { statuses, .. } => Some(statuses),
        }
    }

    /// Whether the cycle gate tripped
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Analysis::Cyclic { .. })
    }

    /// Per-status counts, or `None` when the graph is cyclic
    pub fn summary(&self) -> Option<StatusSummary> {
        self.statuses().map(StatusSummary::from_statuses)
    }

    /// Layout input for an external engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleDetected` if the graph is cyclic.
    pub fn layout_request(&self, sizing: &NodeSizing) -> Result<LayoutRequest> {
        match self {
            Analysis::Cyclic { .. } => Err(Error::CycleDetected),
            Analysis::Acyclic { graph, .. } => Ok(LayoutRequest::from_graph(graph, sizing)),
        }
    }

    /// Lay out the graph with `engine` and join the result with statuses.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleDetected` if the graph is cyclic, or the engine's
    /// error if layout fails.
    pub fn render(&self, engine: &dyn LayoutEngine, sizing: &NodeSizing) -> Result<RenderModel> {
        let Analysis::Acyclic { graph, statuses } = self else {
            return Err(Error::CycleDetected);
        };
        let request = LayoutRequest::from_graph(graph, sizing);
        let layout = engine.layout(&request)?;
        Ok(RenderModel::assemble(graph, statuses, layout, sizing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetDependency, AssetKey, AssetStatus, Materialization};
    use crate::layout::{Layout, Point};
    use std::cell::Cell;

    fn def(name: &str, ts: f64, upstream: &[&str]) -> AssetDefinition {
        let mut definition = AssetDefinition::new(AssetKey::new([name]));
        definition.dependencies = upstream
            .iter()
            .map(|up| AssetDependency::new("in", AssetKey::new([*up])))
            .collect();
        definition.materializations = vec![Materialization::at(ts)];
        definition
    }

    /// Places every node on a diagonal and counts calls.
    struct DiagonalEngine {
        calls: Cell<usize>,
    }

    impl LayoutEngine for DiagonalEngine {
        fn layout(&self, request: &LayoutRequest) -> Result<Layout> {
            self.calls.set(self.calls.get() + 1);
            let mut layout = Layout::default();
            for (i, node) in request.nodes.iter().enumerate() {
                let offset = f64::from(u32::try_from(i).unwrap()) * 100.0;
                layout.nodes.insert(node.id.clone(), Point { x: offset, y: offset });
            }
            layout.width = 100.0 * f64::from(u32::try_from(request.nodes.len()).unwrap());
            layout.height = layout.width;
            Ok(layout)
        }
    }

    #[test]
    fn acyclic_snapshot_gets_statuses() {
        let analysis = Analysis::run(vec![def("a", 10.0, &[]), def("b", 5.0, &["a"])]);
        assert!(!analysis.is_cyclic());
        let statuses = analysis.statuses().unwrap();
        assert_eq!(statuses[&AssetKey::new(["b"]).node_id()], AssetStatus::Old);
        assert_eq!(analysis.summary().unwrap().old, 1);
    }

    #[test]
    fn cyclic_snapshot_skips_statuses_and_layout() {
        let analysis = Analysis::run(vec![def("a", 1.0, &["b"]), def("b", 1.0, &["a"])]);
        assert!(analysis.is_cyclic());
        assert!(analysis.statuses().is_none());
        assert!(analysis.summary().is_none());
        assert!(matches!(
            analysis.layout_request(&NodeSizing::default()),
            Err(Error::CycleDetected)
        ));

        let engine = DiagonalEngine { calls: Cell::new(0) };
        assert!(matches!(
            analysis.render(&engine, &NodeSizing::default()),
            Err(Error::CycleDetected)
        ));
        assert_eq!(engine.calls.get(), 0, "layout engine must not run on a cycle");
        assert_eq!(analysis.graph().node_count(), 2);
    }

    #[test]
    fn render_joins_layout_and_statuses() {
        let analysis = Analysis::run(vec![def("a", 10.0, &[]), def("b", 20.0, &["a"])]);
        let engine = DiagonalEngine { calls: Cell::new(0) };
        let model = analysis.render(&engine, &NodeSizing::default()).unwrap();

        assert_eq!(engine.calls.get(), 1);
        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.nodes[1].position, Point { x: 100.0, y: 100.0 });
        assert!(model.nodes.iter().all(|n| n.status == AssetStatus::Good));
        assert_eq!(model.width, 200.0);
    }
}
