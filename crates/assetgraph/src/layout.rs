//! Layout input preparation and render model assembly.
//!
//! Node positioning and edge routing belong to an external layout engine.
//! This module prepares what that engine consumes (node sizes and edges),
//! defines the shape of what it returns, and joins its output with the
//! graph and the status map for the rendering surface.

use crate::domain::{AssetDefinition, AssetStatus, NodeId, RunRecord};
use crate::error::{Error, Result};
use crate::graph::{AssetGraph, StatusMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pixel constants used to size graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NodeSizing {
    /// Lower bound on the text-driven part of the width
    pub min_width: f64,
    /// Width per character of the joined key path
    pub char_width: f64,
    /// Added to every width
    pub padding: f64,
    /// Height of a bare node
    pub base_height: f64,
    /// Extra height when a description is present
    pub description_height: f64,
    /// Extra height when the asset has been materialized
    pub materialization_height: f64,
    /// Extra height when the latest materialization has a known run
    pub run_height: f64,
}

impl Default for NodeSizing {
    fn default() -> Self {
        Self {
            min_width: 250.0,
            char_width: 9.5,
            padding: 25.0,
            base_height: 40.0,
            description_height: 25.0,
            materialization_height: 22.0,
            run_height: 22.0,
        }
    }
}

/// Width and height of a node, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl NodeSizing {
    /// Display dimensions of the node for `definition`.
    ///
    /// Width is `max(min_width, char_width * L) + padding` where `L` is the
    /// length of the key path joined with `>`, counted in UTF-16 code units
    /// so that characters outside the Basic Multilingual Plane count twice.
    pub fn dimensions(&self, definition: &AssetDefinition) -> Dimensions {
        let label_len = definition.asset_key.display_path().encode_utf16().count();
        let label_len = f64::from(u32::try_from(label_len).unwrap_or(u32::MAX));
        let width = (self.char_width * label_len).max(self.min_width) + self.padding;

        let mut height = self.base_height;
        if definition.description.is_some() {
            height += self.description_height;
        }
        if let Some(latest) = definition.latest_materialization() {
            height += self.materialization_height;
            if latest.run_record().is_some() {
                height += self.run_height;
            }
        }

        Dimensions { width, height }
    }
}

/// A node as handed to the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Node identity
    pub id: NodeId,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

/// An edge as handed to the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdgeSpec {
    /// Upstream node
    pub upstream: NodeId,
    /// Downstream node
    pub downstream: NodeId,
}

/// Everything an external layout engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    /// Nodes with their sizes, in graph order
    pub nodes: Vec<LayoutNode>,
    /// Edges, in registration order
    pub edges: Vec<LayoutEdgeSpec>,
}

impl LayoutRequest {
    /// Prepare a layout request for `graph`.
    pub fn from_graph(graph: &AssetGraph, sizing: &NodeSizing) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                let Dimensions { width, height } = sizing.dimensions(node.definition());
                LayoutNode {
                    id: node.id().clone(),
                    width,
                    height,
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(upstream, downstream, _)| LayoutEdgeSpec {
                upstream: upstream.clone(),
                downstream: downstream.clone(),
            })
            .collect();

        Self { nodes, edges }
    }
}

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// A routed edge returned by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// Upstream node
    pub upstream: NodeId,
    /// Downstream node
    pub downstream: NodeId,
    /// Start point
    pub from: Point,
    /// End point
    pub to: Point,
}

/// Output of a layout engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    /// Position of each node
    pub nodes: HashMap<NodeId, Point>,
    /// Routed edges
    pub edges: Vec<LayoutEdge>,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
}

/// An external layout engine.
///
/// Implementations position nodes and route edges; nothing in this crate
/// depends on how.
pub trait LayoutEngine {
    /// Lay out the requested nodes and edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::Layout` if the engine cannot produce a layout.
    fn layout(&self, request: &LayoutRequest) -> Result<Layout>;
}

/// A layout computed ahead of time, e.g. read back from an engine's JSON output.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedLayout {
    layout: Layout,
}

impl PrecomputedLayout {
    /// Wrap an existing layout
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Parse a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the text is not a valid layout.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl LayoutEngine for PrecomputedLayout {
    fn layout(&self, request: &LayoutRequest) -> Result<Layout> {
        let missing = request
            .nodes
            .iter()
            .filter(|node| !self.layout.nodes.contains_key(&node.id))
            .count();
        if missing == request.nodes.len() && missing > 0 {
            return Err(Error::Layout(
                "precomputed layout does not position any requested node".to_string(),
            ));
        }
        Ok(self.layout.clone())
    }
}

/// A node ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    /// Node identity
    pub id: NodeId,
    /// Key path joined with `>`
    pub label: String,
    /// Position from the layout engine
    pub position: Point,
    /// Display size
    pub size: Dimensions,
    /// Freshness status
    pub status: AssetStatus,
    /// Description, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Timestamp of the latest materialization, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_materialized: Option<f64>,
    /// Run behind the latest materialization, if it resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_run: Option<RunRecord>,
}

/// Graph, layout and statuses joined for the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    /// Drawable nodes
    pub nodes: Vec<RenderNode>,
    /// Routed edges
    pub edges: Vec<LayoutEdge>,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
}

impl RenderModel {
    /// Join graph nodes with their layout position and status.
    ///
    /// Nodes the layout did not position, or that have no status, are
    /// skipped with a warning.
    pub fn assemble(
        graph: &AssetGraph,
        statuses: &StatusMap,
        layout: Layout,
        sizing: &NodeSizing,
    ) -> Self {
        let mut nodes = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let (Some(&position), Some(&status)) =
                (layout.nodes.get(node.id()), statuses.get(node.id()))
            else {
                tracing::warn!(asset = %node.id(), "Node missing from layout or status map, skipping");
                continue;
            };

            let definition = node.definition();
            let latest = definition.latest_materialization();
            nodes.push(RenderNode {
                id: node.id().clone(),
                label: node.key().display_path(),
                position,
                size: sizing.dimensions(definition),
                status,
                description: definition.description.clone(),
                last_materialized: latest.map(crate::domain::Materialization::timestamp),
                latest_run: latest.and_then(|m| m.run_record().cloned()),
            });
        }

        Self {
            nodes,
            edges: layout.edges,
            width: layout.width,
            height: layout.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AssetDependency, AssetKey, Materialization, RunRecord, RunReference, RunStatus,
    };
    use crate::graph::compute_statuses;

    fn run() -> RunReference {
        RunReference::Run(RunRecord {
            run_id: "r1".to_string(),
            pipeline_name: "daily".to_string(),
            mode: "default".to_string(),
            status: RunStatus::Success,
        })
    }

    #[test]
    fn short_key_uses_minimum_width() {
        let def = AssetDefinition::new(AssetKey::new(["a", "b"]));
        let dims = NodeSizing::default().dimensions(&def);
        assert_eq!(dims.width, 275.0);
        assert_eq!(dims.height, 40.0);
    }

    #[test]
    fn long_key_scales_width_by_characters() {
        // "abcdefghij>abcdefghij>abcdefghij" is 32 characters
        let segment = "abcdefghij";
        let def = AssetDefinition::new(AssetKey::new([segment, segment, segment]));
        let dims = NodeSizing::default().dimensions(&def);
        assert_eq!(dims.width, 9.5 * 32.0 + 25.0);
    }

    #[test]
    fn astral_characters_count_as_two_units() {
        // 30 crabs are 30 chars but 60 UTF-16 code units
        let def = AssetDefinition::new(AssetKey::new(["\u{1F980}".repeat(30)]));
        let dims = NodeSizing::default().dimensions(&def);
        assert_eq!(dims.width, 9.5 * 60.0 + 25.0);
    }

    #[test]
    fn height_grows_with_description_materialization_and_run() {
        let mut def = AssetDefinition::new(AssetKey::new(["a"]));
        def.description = Some("orders table".to_string());
        assert_eq!(NodeSizing::default().dimensions(&def).height, 65.0);

        def.materializations = vec![Materialization::at(1.0)];
        assert_eq!(NodeSizing::default().dimensions(&def).height, 87.0);

        def.materializations = vec![Materialization::at(1.0).with_run(run())];
        assert_eq!(NodeSizing::default().dimensions(&def).height, 109.0);
    }

    #[test]
    fn unresolved_run_adds_no_height() {
        let mut def = AssetDefinition::new(AssetKey::new(["a"]));
        def.materializations = vec![Materialization::at(1.0).with_run(RunReference::RunNotFound {
            run_id: "gone".to_string(),
        })];
        assert_eq!(NodeSizing::default().dimensions(&def).height, 62.0);
    }

    #[test]
    fn only_latest_materialization_run_counts() {
        let mut def = AssetDefinition::new(AssetKey::new(["a"]));
        def.materializations = vec![
            Materialization::at(1.0).with_run(run()),
            Materialization::at(2.0),
        ];
        assert_eq!(NodeSizing::default().dimensions(&def).height, 62.0);
    }

    fn two_node_graph() -> AssetGraph {
        let a = AssetDefinition::new(AssetKey::new(["a"]));
        let mut b = AssetDefinition::new(AssetKey::new(["b"]));
        b.dependencies = vec![AssetDependency::new("a_in", AssetKey::new(["a"]))];
        AssetGraph::build(vec![a, b])
    }

    #[test]
    fn layout_request_lists_nodes_and_edges() {
        let request = LayoutRequest::from_graph(&two_node_graph(), &NodeSizing::default());
        assert_eq!(request.nodes.len(), 2);
        assert_eq!(request.nodes[0].id, AssetKey::new(["a"]).node_id());
        assert_eq!(
            request.edges,
            vec![LayoutEdgeSpec {
                upstream: AssetKey::new(["a"]).node_id(),
                downstream: AssetKey::new(["b"]).node_id(),
            }]
        );
    }

    #[test]
    fn render_model_skips_unpositioned_nodes() {
        let graph = two_node_graph();
        let statuses = compute_statuses(&graph);
        let mut layout = Layout {
            width: 400.0,
            height: 300.0,
            ..Layout::default()
        };
        layout
            .nodes
            .insert(AssetKey::new(["a"]).node_id(), Point { x: 10.0, y: 20.0 });

        let model = RenderModel::assemble(&graph, &statuses, layout, &NodeSizing::default());
        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.nodes[0].label, "a");
        assert_eq!(model.nodes[0].status, AssetStatus::Unmaterialized);
        assert_eq!(model.width, 400.0);
    }

    #[test]
    fn precomputed_layout_rejects_disjoint_layout() {
        let request = LayoutRequest::from_graph(&two_node_graph(), &NodeSizing::default());
        let engine = PrecomputedLayout::new(Layout::default());
        assert!(matches!(engine.layout(&request), Err(Error::Layout(_))));
    }

    #[test]
    fn sizing_overrides_deserialize_with_defaults() {
        let sizing: NodeSizing = serde_yaml::from_str("min-width: 100\nchar-width: 8").unwrap();
        assert_eq!(sizing.min_width, 100.0);
        assert_eq!(sizing.char_width, 8.0);
        assert_eq!(sizing.padding, 25.0);
    }
}
