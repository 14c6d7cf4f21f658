//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that resolves configuration and
//! the snapshot source, and runs one analysis per command.
//!
//! # Example
//!
//! ```no_run
//! use assetgraph::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new("."), Some(Path::new("assets.jsonl")), None).await?;
//!     let (analysis, _warnings) = app.analyze().await?;
//!     println!("cyclic: {}", analysis.is_cyclic());
//!     Ok(())
//! }
//! ```

use crate::analysis::Analysis;
use crate::config::AssetGraphConfig;
use crate::error::{Error, Result};
use crate::source::{AssetSource, JsonlSource, LoadWarning};
use std::path::Path;

/// Application context for CLI operations.
pub struct App {
    /// Resolved configuration
    config: AssetGraphConfig,

    /// The snapshot source (trait object for polymorphism)
    source: Box<dyn AssetSource>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("source", &self.source.describe())
            .finish()
    }
}

impl App {
    /// Create an App from the working directory and command-line overrides.
    ///
    /// Configuration comes from `config_path` when given, otherwise from the
    /// nearest `assetgraph.yaml` above `working_dir`. An explicit `snapshot`
    /// takes precedence over the configured one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A config file exists but cannot be loaded
    /// - Neither the command line nor the config names a snapshot
    pub async fn from_directory(
        working_dir: &Path,
        snapshot: Option<&Path>,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        let config = AssetGraphConfig::resolve(config_path, working_dir).await?;

        let path = match (snapshot, &config.snapshot) {
            (Some(explicit), _) => explicit.to_path_buf(),
            (None, Some(configured)) => configured.clone(),
            (None, None) => {
                return Err(Error::Config(
                    "no snapshot given: pass a snapshot path or set `snapshot` in assetgraph.yaml"
                        .to_string(),
                ));
            }
        };

        tracing::debug!(snapshot = %path.display(), "Using snapshot");
        Ok(Self::new(config, Box::new(JsonlSource::new(path))))
    }

    /// Create an App over an existing source.
    pub fn new(config: AssetGraphConfig, source: Box<dyn AssetSource>) -> Self {
        Self { config, source }
    }

    /// The resolved configuration
    pub fn config(&self) -> &AssetGraphConfig {
        &self.config
    }

    /// The snapshot source
    pub fn source(&self) -> &dyn AssetSource {
        self.source.as_ref()
    }

    /// Fetch one snapshot and analyze it.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be fetched.
    pub async fn analyze(&self) -> Result<(Analysis, Vec<LoadWarning>)> {
        let snapshot = self.source.fetch().await?;
        let analysis = Analysis::run(snapshot.definitions);
        if analysis.is_cyclic() {
            tracing::warn!(source = %self.source.describe(), "Asset graph contains a cycle");
        }
        Ok((analysis, snapshot.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::domain::{AssetDefinition, AssetKey};
    use crate::source::StaticSource;
    use tempfile::TempDir;

    #[tokio::test]
    async fn explicit_snapshot_wins_over_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "snapshot: configured.jsonl\n",
        )
        .unwrap();
        let explicit = temp.path().join("explicit.jsonl");

        let app = App::from_directory(temp.path(), Some(&explicit), None)
            .await
            .unwrap();
        assert_eq!(app.source().describe(), explicit.display().to_string());
    }

    #[tokio::test]
    async fn configured_snapshot_is_used_when_none_given() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "snapshot: configured.jsonl\n",
        )
        .unwrap();

        let app = App::from_directory(temp.path(), None, None).await.unwrap();
        assert_eq!(
            app.source().describe(),
            temp.path().join("configured.jsonl").display().to_string()
        );
    }

    #[tokio::test]
    async fn missing_snapshot_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("empty.yaml");
        std::fs::write(&config, "{}\n").unwrap();

        let err = App::from_directory(temp.path(), None, Some(&config))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn analyze_runs_over_source() {
        let app = App::new(
            AssetGraphConfig::default(),
            Box::new(StaticSource::new(vec![AssetDefinition::new(AssetKey::new(
                ["a"],
            ))])),
        );

        let (analysis, warnings) = app.analyze().await.unwrap();
        assert!(warnings.is_empty());
        assert!(!analysis.is_cyclic());
        assert_eq!(analysis.graph().node_count(), 1);
    }
}
