//! Assetgraph - asset lineage and freshness for data pipelines.
//!
//! This crate builds a directed dependency graph from a snapshot of asset
//! definitions, detects cycles, and propagates a freshness status from
//! upstream to downstream assets. It provides both a CLI application and a
//! library.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod layout;
pub mod source;

// Application context and CLI (needed by binary)
pub mod app;
pub mod cli;

// Output formatting
pub mod output;
