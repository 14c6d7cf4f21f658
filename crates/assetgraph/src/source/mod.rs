//! Asset definition sources.
//!
//! A source supplies one snapshot of asset definitions per fetch. Every
//! computation in this crate is derived from a single snapshot; nothing is
//! carried from one fetch to the next.
//!
//! Implementations:
//!
//! - [`JsonlSource`]: a JSON Lines file, one asset definition per line
//! - [`StaticSource`]: a fixed in-memory list
//!
//! # Example
//!
//! ```no_run
//! use assetgraph::analysis::Analysis;
//! use assetgraph::source::{AssetSource, JsonlSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let source = JsonlSource::new("assets.jsonl");
//!     let snapshot = source.fetch().await?;
//!     let analysis = Analysis::run(snapshot.definitions);
//!     println!("cyclic: {}", analysis.is_cyclic());
//!     Ok(())
//! }
//! ```

mod jsonl;

pub use jsonl::JsonlSource;

use crate::domain::AssetDefinition;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Non-fatal problems found while loading a snapshot.
///
/// The offending record is skipped and loading continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line that is not a valid asset definition
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A definition whose asset key has no path segments
    EmptyAssetKey {
        /// 1-based line number
        line_number: usize,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: skipped malformed record: {error}")
            }
            LoadWarning::EmptyAssetKey { line_number } => {
                write!(f, "line {line_number}: skipped record with empty asset key")
            }
        }
    }
}

/// One snapshot of asset definitions.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Definitions in source order
    pub definitions: Vec<AssetDefinition>,

    /// Records that were skipped
    pub warnings: Vec<LoadWarning>,
}

/// A supplier of asset definition snapshots.
///
/// The trait is object-safe so callers can hold a `Box<dyn AssetSource>`.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read at all. Individual bad
    /// records are reported as [`LoadWarning`]s instead.
    async fn fetch(&self) -> Result<Snapshot>;

    /// Human-readable description of where snapshots come from
    fn describe(&self) -> String;
}

/// A source that always returns the same definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    definitions: Vec<AssetDefinition>,
}

impl StaticSource {
    /// Create a source over fixed definitions
    pub fn new(definitions: Vec<AssetDefinition>) -> Self {
        Self { definitions }
    }
}

#[async_trait]
impl AssetSource for StaticSource {
    async fn fetch(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            definitions: self.definitions.clone(),
            warnings: Vec::new(),
        })
    }

    fn describe(&self) -> String {
        format!("{} static definitions", self.definitions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetKey;

    #[tokio::test]
    async fn static_source_returns_its_definitions() {
        let source: Box<dyn AssetSource> = Box::new(StaticSource::new(vec![
            AssetDefinition::new(AssetKey::new(["a"])),
            AssetDefinition::new(AssetKey::new(["b"])),
        ]));

        let first = source.fetch().await.unwrap();
        let second = source.fetch().await.unwrap();
        assert_eq!(first.definitions, second.definitions);
        assert_eq!(first.definitions.len(), 2);
        assert!(first.warnings.is_empty());
        assert_eq!(source.describe(), "2 static definitions");
    }

    #[test]
    fn warnings_display_line_numbers() {
        let warning = LoadWarning::EmptyAssetKey { line_number: 7 };
        assert_eq!(warning.to_string(), "line 7: skipped record with empty asset key");
    }
}
