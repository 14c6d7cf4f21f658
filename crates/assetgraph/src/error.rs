//! Error types for assetgraph operations.
//!
//! The graph computations themselves never fail on well-formed input; these
//! errors cover the shell around them: reading snapshots and configuration,
//! looking up assets by key, and refusing to run on cyclic graphs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for assetgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A snapshot could not be loaded at all.
    #[error("Snapshot error in {path}: {message}")]
    Snapshot {
        /// Path of the snapshot file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// No asset with the given key exists in the graph.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The asset graph contains a cycle, so statuses and layout are undefined.
    #[error("Asset graph contains a cycle")]
    CycleDetected,

    /// The external layout engine failed.
    #[error("Layout error: {0}")]
    Layout(String),
}

/// A specialized Result type for assetgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
