//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use assetgraph::domain::{AssetDefinition, AssetDependency, AssetKey, Materialization};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the compiled assetgraph binary
pub fn assetgraph_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_assetgraph"))
}

/// Run the assetgraph binary in `dir` with colors disabled
pub fn run_assetgraph_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(assetgraph_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("ASSETGRAPH_ASCII", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute assetgraph binary")
}

/// A single-segment definition materialized at `ts` (`None` for never)
/// depending on the named upstream assets, with input names `<upstream>_in`.
pub fn def(name: &str, ts: Option<f64>, upstream: &[&str]) -> AssetDefinition {
    let mut definition = AssetDefinition::new(AssetKey::new([name]));
    definition.dependencies = upstream
        .iter()
        .map(|up| AssetDependency::new(format!("{up}_in"), AssetKey::new([*up])))
        .collect();
    if let Some(ts) = ts {
        definition.materializations.push(Materialization::at(ts));
    }
    definition
}

/// Write definitions as a JSONL snapshot and return its path
pub fn write_snapshot(dir: &Path, file_name: &str, definitions: &[AssetDefinition]) -> PathBuf {
    let content: String = definitions
        .iter()
        .map(|d| serde_json::to_string(d).expect("Failed to serialize definition") + "\n")
        .collect();
    let path = dir.join(file_name);
    std::fs::write(&path, content).expect("Failed to write snapshot");
    path
}

/// raw(100) -> clean(50) -> report(200), plus a never-materialized scratch asset
pub fn pipeline() -> Vec<AssetDefinition> {
    vec![
        def("raw", Some(100.0), &[]),
        def("clean", Some(50.0), &["raw"]),
        def("report", Some(200.0), &["clean"]),
        def("scratch", None, &[]),
    ]
}
