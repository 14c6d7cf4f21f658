//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result};

use super::args::{CheckArgs, LayoutInputArgs, RenderArgs, SchemaArgs, ShowArgs, StatusArgs};
use crate::analysis::Analysis;
use crate::app::App;
use crate::domain::{AssetDefinition, AssetStatus, NodeId};
use crate::error::Error;
use crate::graph::{AssetGraph, StatusSummary};
use crate::output::{self, OutputMode};

/// Execute the status command
pub async fn execute_status(app: &App, args: &StatusArgs, output_mode: OutputMode) -> Result<()> {
    let (analysis, warnings) = app.analyze().await?;
    output::print_load_warnings(&warnings)?;

    let Analysis::Acyclic { graph, statuses } = &analysis else {
        output::print_cycle_notice(output_mode)?;
        return Ok(());
    };

    let only: Vec<AssetStatus> = args.only.iter().map(|&arg| arg.into()).collect();
    let assets = graph
        .nodes()
        .filter_map(|node| {
            let status = *statuses.get(node.id())?;
            (only.is_empty() || only.contains(&status)).then(|| output::StatusRow {
                id: node.id().clone(),
                key: node.key().display_path(),
                status,
            })
        })
        .collect();

    let report = output::StatusReport {
        assets,
        summary: StatusSummary::from_statuses(statuses),
    };
    output::print_status_report(&report, output_mode)?;

    Ok(())
}

/// Execute the check command
pub async fn execute_check(app: &App, _args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let (analysis, warnings) = app.analyze().await?;
    output::print_load_warnings(&warnings)?;

    if analysis.is_cyclic() {
        output::print_cycle_notice(output_mode)?;
        return Err(Error::CycleDetected.into());
    }

    let graph = analysis.graph();
    let dangling = graph.dangling_dependencies();

    match output_mode {
        OutputMode::Json => {
            let dangling_json: Vec<_> = dangling
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "downstream": d.downstream,
                        "upstream": d.upstream,
                        "input": d.input_name,
                    })
                })
                .collect();
            output::print_json(&serde_json::json!({
                "cyclic": false,
                "assets": graph.node_count(),
                "edges": graph.edge_count(),
                "dangling_dependencies": dangling_json,
            }))?;
        }
        OutputMode::Text => {
            let config = output::OutputConfig::from_env();
            output::print_message(&output::success(
                &format!(
                    "No cycles: {} assets, {} edges",
                    graph.node_count(),
                    graph.edge_count()
                ),
                &config,
            ))?;
            if !dangling.is_empty() {
                output::print_message(&format!(
                    "{} dependencies reference assets missing from the snapshot:",
                    dangling.len()
                ))?;
                for d in dangling {
                    output::print_message(&format!(
                        "  {} <- {} [{}]",
                        display_key(graph, &d.downstream),
                        d.upstream,
                        d.input_name
                    ))?;
                }
            }
        }
    }

    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let (analysis, warnings) = app.analyze().await?;
    output::print_load_warnings(&warnings)?;

    let graph = analysis.graph();
    let node = graph.lookup(&args.asset_key)?;
    let definition: &AssetDefinition = node.definition();

    let links = |neighbors: Vec<(&NodeId, &str)>| -> Vec<output::AssetLink> {
        neighbors
            .into_iter()
            .map(|(id, input)| output::AssetLink {
                key: display_key(graph, id),
                input: input.to_string(),
            })
            .collect()
    };

    let details = output::AssetDetails {
        key: node.key().display_path(),
        id: node.id().clone(),
        status: analysis
            .statuses()
            .and_then(|statuses| statuses.get(node.id()).copied()),
        description: definition.description.clone(),
        op_name: definition.op_name.clone(),
        job_names: definition.job_names.clone(),
        upstream: links(graph.upstream(node.id())),
        downstream: links(graph.downstream(node.id())),
        materialization_count: definition.materializations.len(),
        latest_materialization: definition.latest_materialization().cloned(),
    };

    output::print_asset_details(&details, output_mode)?;

    Ok(())
}

/// Execute the layout-input command
///
/// The layout request is always JSON since it feeds another program.
pub async fn execute_layout_input(
    app: &App,
    _args: &LayoutInputArgs,
    _output_mode: OutputMode,
) -> Result<()> {
    let (analysis, warnings) = app.analyze().await?;
    output::print_load_warnings(&warnings)?;

    let request = analysis.layout_request(&app.config().sizing)?;
    output::print_json(&request)?;

    Ok(())
}

/// Execute the render command
pub async fn execute_render(app: &App, args: &RenderArgs, _output_mode: OutputMode) -> Result<()> {
    use crate::layout::PrecomputedLayout;

    let (analysis, warnings) = app.analyze().await?;
    output::print_load_warnings(&warnings)?;

    let content = tokio::fs::read_to_string(&args.layout)
        .await
        .with_context(|| format!("Failed to read layout {}", args.layout.display()))?;
    let engine = PrecomputedLayout::from_json(&content)
        .with_context(|| format!("Invalid layout in {}", args.layout.display()))?;

    let model = analysis.render(&engine, &app.config().sizing)?;
    output::print_json(&model)?;

    Ok(())
}

/// Execute the schema command
pub fn execute_schema(_args: &SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(AssetDefinition);
    output::print_json(&schema)?;
    Ok(())
}

/// Key path of a node in the graph, or its raw id if it is not one.
fn display_key(graph: &AssetGraph, id: &NodeId) -> String {
    graph
        .node(id)
        .map_or_else(|| id.to_string(), |node| node.key().display_path())
}
