//! Assetgraph CLI binary.

use anyhow::Result;
use assetgraph::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the assetgraph CLI.
///
/// Uses tokio's current_thread runtime; every command reads one snapshot and
/// runs sequentially.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=assetgraph=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("assetgraph=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting assetgraph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Assetgraph CLI completed successfully");
    Ok(())
}
