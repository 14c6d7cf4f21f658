//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for assetgraph using
//! clap's derive API.
//!
//! # Commands
//!
//! - `status`: Per-asset freshness status with summary counts
//! - `check`: Fail when the asset graph has a cycle
//! - `show`: Show details of one asset
//! - `layout-input`: Emit node sizes and edges for an external layout engine
//! - `render`: Join an external layout with statuses
//! - `schema`: Print the JSON Schema of a snapshot record
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Use this config file instead of searching for assetgraph.yaml
//!
//! # Example
//!
//! ```bash
//! assetgraph status assets.jsonl --only old,downstream-from-old
//! assetgraph show "warehouse>orders" assets.jsonl
//! assetgraph layout-input assets.jsonl > request.json
//! ```

mod args;
mod execute;
mod types;
mod validators;

use crate::app::App;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Re-export argument structs
pub use args::{CheckArgs, LayoutInputArgs, RenderArgs, SchemaArgs, ShowArgs, StatusArgs};

// Re-export types
pub use types::StatusArg;

// Re-export validators for external use
pub use validators::validate_asset_key;

/// Assetgraph - asset lineage and freshness for data pipelines
///
/// Builds the dependency graph of a snapshot of asset definitions, checks it
/// for cycles and reports which assets are stale relative to their upstreams.
#[derive(Parser, Debug)]
#[command(name = "assetgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to the nearest assetgraph.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the freshness status of every asset
    ///
    /// An asset is `old` when a direct upstream was materialized more
    /// recently, `downstream-from-old` when staleness is inherited, and
    /// `none` when it has never been materialized.
    Status(StatusArgs),

    /// Check the asset graph for cycles
    ///
    /// Exits with an error when the graph is cyclic.
    Check(CheckArgs),

    /// Show detailed information about an asset
    Show(ShowArgs),

    /// Emit the layout request for an external layout engine
    ///
    /// Prints node ids with their width and height, plus the edges, as JSON.
    LayoutInput(LayoutInputArgs),

    /// Join an external layout with asset statuses
    ///
    /// Prints the render model as JSON.
    Render(RenderArgs),

    /// Print the JSON Schema of one snapshot record
    Schema(SchemaArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Status(args)) => {
                let app = self.load_app(args.snapshot.as_deref()).await?;
                execute::execute_status(&app, args, output_mode).await
            }
            Some(Commands::Check(args)) => {
                let app = self.load_app(args.snapshot.as_deref()).await?;
                execute::execute_check(&app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = self.load_app(args.snapshot.as_deref()).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::LayoutInput(args)) => {
                let app = self.load_app(args.snapshot.as_deref()).await?;
                execute::execute_layout_input(&app, args, output_mode).await
            }
            Some(Commands::Render(args)) => {
                let app = self.load_app(args.snapshot.as_deref()).await?;
                execute::execute_render(&app, args, output_mode).await
            }
            Some(Commands::Schema(args)) => execute::execute_schema(args),
            None => {
                println!("Assetgraph asset lineage and freshness");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }

    /// Resolve config and snapshot relative to the working directory
    async fn load_app(&self, snapshot: Option<&std::path::Path>) -> crate::error::Result<App> {
        App::from_directory(&std::env::current_dir()?, snapshot, self.config.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetKey;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["assetgraph"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "assetgraph",
            "status",
            "--json",
            "--config",
            "conf/assetgraph.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("conf/assetgraph.yaml")));
        assert!(matches!(cli.command, Some(Commands::Status(_))));
    }

    #[test]
    fn test_parse_status_with_filter() {
        let cli = Cli::try_parse_from([
            "assetgraph",
            "status",
            "assets.jsonl",
            "--only",
            "old,none",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Status(args)) => {
                assert_eq!(args.snapshot, Some(PathBuf::from("assets.jsonl")));
                assert_eq!(args.only, vec![StatusArg::Old, StatusArg::Unmaterialized]);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_parse_status_rejects_unknown_status() {
        let result = Cli::try_parse_from(["assetgraph", "status", "--only", "stale"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_show_key_and_snapshot() {
        let cli =
            Cli::try_parse_from(["assetgraph", "show", "warehouse/orders", "assets.jsonl"]).unwrap();
        match cli.command {
            Some(Commands::Show(args)) => {
                assert_eq!(args.asset_key, AssetKey::new(["warehouse", "orders"]));
                assert_eq!(args.snapshot, Some(PathBuf::from("assets.jsonl")));
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_show_requires_key() {
        assert!(Cli::try_parse_from(["assetgraph", "show"]).is_err());
        assert!(Cli::try_parse_from(["assetgraph", "show", ">"]).is_err());
    }

    #[test]
    fn test_parse_render_requires_layout() {
        assert!(Cli::try_parse_from(["assetgraph", "render", "assets.jsonl"]).is_err());

        let cli = Cli::try_parse_from(["assetgraph", "render", "-l", "layout.json"]).unwrap();
        match cli.command {
            Some(Commands::Render(args)) => {
                assert!(args.snapshot.is_none());
                assert_eq!(args.layout, PathBuf::from("layout.json"));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_parse_layout_input_and_schema() {
        let cli = Cli::try_parse_from(["assetgraph", "layout-input"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::LayoutInput(_))));

        let cli = Cli::try_parse_from(["assetgraph", "schema"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Schema(_))));
    }
}
