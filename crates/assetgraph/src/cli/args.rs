//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::types::StatusArg;
use super::validators::validate_asset_key;
use crate::domain::AssetKey;

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Snapshot file (JSONL); defaults to `snapshot` from assetgraph.yaml
    pub snapshot: Option<PathBuf>,

    /// Only list assets with these statuses (comma-separated)
    ///
    /// The summary line still counts every asset.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub only: Vec<StatusArg>,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Snapshot file (JSONL); defaults to `snapshot` from assetgraph.yaml
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Asset key, with segments separated by '>' or '/'
    #[arg(value_parser = validate_asset_key)]
    pub asset_key: AssetKey,

    /// Snapshot file (JSONL); defaults to `snapshot` from assetgraph.yaml
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `layout-input` command
#[derive(Parser, Debug, Clone)]
pub struct LayoutInputArgs {
    /// Snapshot file (JSONL); defaults to `snapshot` from assetgraph.yaml
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `render` command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Snapshot file (JSONL); defaults to `snapshot` from assetgraph.yaml
    pub snapshot: Option<PathBuf>,

    /// Layout produced by an external engine (JSON)
    #[arg(short, long)]
    pub layout: PathBuf,
}

/// Arguments for the `schema` command
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {}
