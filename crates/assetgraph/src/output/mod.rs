//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::domain::{AssetStatus, Materialization, NodeId, RunReference};
use crate::graph::StatusSummary;
use crate::source::LoadWarning;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success};

use color::{bold, colored_status_icon, colorize_key, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `ASSETGRAPH_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `ASSETGRAPH_ASCII`: Set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `ASSETGRAPH_COLOR`: Set to "0" or "false" to disable colors
    pub fn from_env() -> Self {
        let max_width = match env::var("ASSETGRAPH_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "ASSETGRAPH_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match env::var("ASSETGRAPH_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "ASSETGRAPH_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/), plus ASSETGRAPH_COLOR for explicit control
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("ASSETGRAPH_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| w.0)
        .into()
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Report Types
// ============================================================================

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    /// Node identity
    pub id: NodeId,
    /// Key path joined with `>`
    pub key: String,
    /// Freshness status
    pub status: AssetStatus,
}

/// The full status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Rows in graph order
    pub assets: Vec<StatusRow>,
    /// Counts over all assets, before filtering
    pub summary: StatusSummary,
}

/// A neighboring asset and the input that connects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetLink {
    /// Key path joined with `>`
    pub key: String,
    /// Input name of the connecting edge
    pub input: String,
}

/// Everything `show` prints about one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDetails {
    /// Key path joined with `>`
    pub key: String,
    /// Node identity
    pub id: NodeId,
    /// Status, absent when the graph is cyclic
    pub status: Option<AssetStatus>,
    /// Description
    pub description: Option<String>,
    /// Producing op
    pub op_name: Option<String>,
    /// Jobs the asset belongs to
    pub job_names: Vec<String>,
    /// Direct upstream assets
    pub upstream: Vec<AssetLink>,
    /// Direct downstream assets
    pub downstream: Vec<AssetLink>,
    /// Number of recorded materializations
    pub materialization_count: usize,
    /// Most recent materialization
    pub latest_materialization: Option<Materialization>,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the status report in the specified format
pub fn print_status_report(report: &StatusReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_status_report_text(&mut handle, report, &config),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Print asset details in the specified format
pub fn print_asset_details(details: &AssetDetails, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => write_asset_details_text(&mut handle, details, &config),
        OutputMode::Json => write_json(&mut handle, details),
    }
}

/// Print the empty state shown when the graph has a cycle
pub fn print_cycle_notice(mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => writeln!(
            handle,
            "{}",
            error(
                "Asset graph contains a cycle; no statuses or layout available.",
                &config
            )
        ),
        OutputMode::Json => write_json(&mut handle, &serde_json::json!({ "cyclic": true })),
    }
}

/// Print snapshot load warnings to stderr
pub fn print_load_warnings(warnings: &[LoadWarning]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let config = OutputConfig::from_env();
    for warning in warnings {
        writeln!(handle, "{} {warning}", color::error("warning:", &config))?;
    }
    Ok(())
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_status_report_text<W: Write>(
    w: &mut W,
    report: &StatusReport,
    config: &OutputConfig,
) -> io::Result<()> {
    if report.assets.is_empty() {
        writeln!(w, "No assets found.")?;
    } else {
        let key_width = report
            .assets
            .iter()
            .map(|row| row.key.chars().count())
            .max()
            .unwrap_or(0);

        for row in &report.assets {
            let padding = key_width.saturating_sub(row.key.chars().count());
            writeln!(
                w,
                "{} {}{}  {}",
                colored_status_icon(row.status, config),
                colorize_key(&row.key, config),
                " ".repeat(padding),
                colorize_status(row.status, config)
            )?;
        }
    }

    writeln!(w)?;
    let counts: Vec<String> = AssetStatus::ALL
        .iter()
        .map(|&status| {
            format!(
                "{} {}",
                report.summary.count(status),
                colorize_status(status, config)
            )
        })
        .collect();
    writeln!(
        w,
        "{} {} ({})",
        bold("Total:", config),
        report.summary.total(),
        counts.join(", ")
    )
}

fn write_asset_details_text<W: Write>(
    w: &mut W,
    details: &AssetDetails,
    config: &OutputConfig,
) -> io::Result<()> {
    let content_width = get_terminal_width().min(config.max_width);

    match details.status {
        Some(status) => writeln!(
            w,
            "{} {}  {}",
            colored_status_icon(status, config),
            bold(&colorize_key(&details.key, config), config),
            colorize_status(status, config)
        )?,
        None => writeln!(w, "{}", bold(&colorize_key(&details.key, config), config))?,
    }
    writeln!(w, "  {} {}", dimmed("Id:", config), details.id)?;

    if let Some(op) = &details.op_name {
        writeln!(w, "  {} {op}", dimmed("Op:", config))?;
    }
    if !details.job_names.is_empty() {
        writeln!(w, "  {} {}", dimmed("Jobs:", config), details.job_names.join(", "))?;
    }

    if let Some(description) = &details.description {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Description", config))?;
        for line in textwrap::wrap(description, content_width.saturating_sub(2).max(20)) {
            writeln!(w, "  {line}")?;
        }
    }

    write_links(w, "Upstream", &details.upstream, config)?;
    write_links(w, "Downstream", &details.downstream, config)?;

    writeln!(w)?;
    writeln!(w, "{}:", bold("Latest materialization", config))?;
    match &details.latest_materialization {
        None => writeln!(w, "  {}", dimmed("never materialized", config))?,
        Some(latest) => {
            writeln!(
                w,
                "  {} {} ({} total)",
                dimmed("At:", config),
                format_timestamp(latest.timestamp()),
                details.materialization_count
            )?;
            if let Some(partition) = &latest.partition {
                writeln!(w, "  {} {partition}", dimmed("Partition:", config))?;
            }
            match &latest.run {
                Some(RunReference::Run(run)) => writeln!(
                    w,
                    "  {} {} ({}, mode {}, {})",
                    dimmed("Run:", config),
                    run.run_id,
                    run.pipeline_name,
                    run.mode,
                    run.status
                )?,
                Some(RunReference::RunNotFound { run_id }) => writeln!(
                    w,
                    "  {} {run_id} {}",
                    dimmed("Run:", config),
                    dimmed("(not found)", config)
                )?,
                Some(RunReference::Error { message }) => writeln!(
                    w,
                    "  {} {}",
                    dimmed("Run:", config),
                    color::error(message, config)
                )?,
                None => {}
            }
        }
    }

    Ok(())
}

fn write_links<W: Write>(
    w: &mut W,
    title: &str,
    links: &[AssetLink],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), links.len())?;
    for link in links {
        writeln!(
            w,
            "  {} {}",
            colorize_key(&link.key, config),
            dimmed(&format!("[{}]", link.input), config)
        )?;
    }
    Ok(())
}

/// Format seconds since the epoch as a UTC timestamp.
pub(crate) fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1000.0).round() as i64;
    chrono::DateTime::from_timestamp_millis(millis).map_or_else(
        || format!("{seconds}"),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
