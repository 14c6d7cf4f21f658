//! Domain types for asset graphs.
//!
//! This module contains the records supplied by the asset data source
//! (definitions, dependencies, materializations, run references) and the
//! derived identity and status types used by the graph computations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when rendering an asset key path for humans.
pub const PATH_SEPARATOR: char = '>';

/// Ordered sequence of path segments uniquely identifying an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AssetKey {
    /// Path segments, outermost first
    pub path: Vec<String>,
}

impl AssetKey {
    /// Create an asset key from path segments
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a user-supplied key such as `warehouse>orders` or `warehouse/orders`.
    ///
    /// A JSON array (`["s3://bucket","raw"]`) is taken verbatim. Otherwise `>`
    /// separates segments when present, so `s3://bucket>raw` keeps its slashes,
    /// and `/` is the separator only for inputs without `>`. Empty segments are
    /// dropped, so `a>>b` and `a>b` name the same asset.
    pub fn parse_user(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with('[')
            && let Ok(path) = serde_json::from_str::<Vec<String>>(s)
        {
            return Self { path };
        }

        let separator = if s.contains(PATH_SEPARATOR) {
            PATH_SEPARATOR
        } else {
            '/'
        };
        Self::new(
            s.split(separator)
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }

    /// Canonical graph identity: the compact JSON array of the path segments.
    pub fn node_id(&self) -> NodeId {
        let segments = self
            .path
            .iter()
            .map(|segment| serde_json::Value::String(segment.clone()))
            .collect();
        NodeId(serde_json::Value::Array(segments).to_string())
    }

    /// Path segments joined with `>`, as shown on a graph node.
    pub fn display_path(&self) -> String {
        self.path.join(&PATH_SEPARATOR.to_string())
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_path())
    }
}

/// Identity of a node in the asset graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Borrow the canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&AssetKey> for NodeId {
    fn from(key: &AssetKey) -> Self {
        key.node_id()
    }
}

/// An asset definition as supplied by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDefinition {
    /// Identity of the asset
    pub asset_key: AssetKey,

    /// Free-text description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of the op that produces the asset (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_name: Option<String>,

    /// Jobs the asset participates in
    #[serde(default)]
    pub job_names: Vec<String>,

    /// Upstream dependencies
    #[serde(default)]
    pub dependencies: Vec<AssetDependency>,

    /// Materialization history, possibly empty
    #[serde(default)]
    pub materializations: Vec<Materialization>,
}

impl AssetDefinition {
    /// Create a definition with no dependencies or history
    pub fn new(asset_key: AssetKey) -> Self {
        Self {
            asset_key,
            description: None,
            op_name: None,
            job_names: Vec::new(),
            dependencies: Vec::new(),
            materializations: Vec::new(),
        }
    }

    /// Graph identity of this definition
    pub fn node_id(&self) -> NodeId {
        self.asset_key.node_id()
    }

    /// Whether the asset has ever been materialized
    pub fn is_materialized(&self) -> bool {
        !self.materializations.is_empty()
    }

    /// The most recent materialization.
    ///
    /// Records are compared by [`Materialization::timestamp`]; on ties the
    /// earliest record in the list wins.
    pub fn latest_materialization(&self) -> Option<&Materialization> {
        self.materializations.iter().reduce(|latest, candidate| {
            if candidate.timestamp() > latest.timestamp() {
                candidate
            } else {
                latest
            }
        })
    }

    /// Timestamp of the most recent materialization, `0.0` if never materialized
    pub fn latest_timestamp(&self) -> f64 {
        self.latest_materialization()
            .map_or(0.0, Materialization::timestamp)
    }
}

/// Dependency of a downstream asset on an upstream asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDependency {
    /// Name of the downstream input that consumes the upstream asset
    pub input_name: String,

    /// Key of the upstream asset
    pub upstream_asset_key: AssetKey,
}

impl AssetDependency {
    /// Create a dependency descriptor
    pub fn new(input_name: impl Into<String>, upstream_asset_key: AssetKey) -> Self {
        Self {
            input_name: input_name.into(),
            upstream_asset_key,
        }
    }
}

/// A recorded event that the asset was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Materialization {
    /// Start/end time of the producing step, in seconds since the epoch
    #[serde(default)]
    pub step_stats: StepStats,

    /// Partition that was materialized (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,

    /// Run that produced the materialization (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunReference>,
}

impl Materialization {
    /// Create a materialization that ended at `end_time`
    pub fn at(end_time: f64) -> Self {
        Self {
            step_stats: StepStats {
                start_time: None,
                end_time: Some(end_time),
            },
            partition: None,
            run: None,
        }
    }

    /// Attach a run reference
    #[must_use]
    pub fn with_run(mut self, run: RunReference) -> Self {
        self.run = Some(run);
        self
    }

    /// Effective timestamp: end time, else start time, else `0.0`
    pub fn timestamp(&self) -> f64 {
        self.step_stats
            .end_time
            .or(self.step_stats.start_time)
            .unwrap_or(0.0)
    }

    /// The run record, if the run reference resolved to a known run
    pub fn run_record(&self) -> Option<&RunRecord> {
        match &self.run {
            Some(RunReference::Run(record)) => Some(record),
            _ => None,
        }
    }
}

/// Timestamp pair of a materialization step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepStats {
    /// Step start, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,

    /// Step end, seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// Resolution of a materialization's run reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RunReference {
    /// The run is known
    Run(RunRecord),

    /// The run id no longer resolves
    RunNotFound {
        /// Id that failed to resolve
        #[serde(rename = "runId")]
        run_id: String,
    },

    /// Resolving the run failed
    Error {
        /// Error message from the backend
        message: String,
    },
}

/// A run that produced a materialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Run identifier
    pub run_id: String,

    /// Pipeline or job name
    pub pipeline_name: String,

    /// Execution mode
    pub mode: String,

    /// Current run status
    pub status: RunStatus,
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Waiting in the run queue
    Queued,
    /// Created but not yet launched
    NotStarted,
    /// Managed outside the orchestrator
    Managed,
    /// Launching
    Starting,
    /// Executing
    Started,
    /// Finished successfully
    Success,
    /// Finished with a failure
    Failure,
    /// Cancellation requested
    Canceling,
    /// Cancelled
    Canceled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::NotStarted => "not started",
            RunStatus::Managed => "managed",
            RunStatus::Starting => "starting",
            RunStatus::Started => "started",
            RunStatus::Success => "success",
            RunStatus::Failure => "failure",
            RunStatus::Canceling => "canceling",
            RunStatus::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// Freshness status of an asset relative to its upstream assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    /// The asset and all its ancestors are at least as fresh as expected
    Good,

    /// A direct upstream asset was materialized more recently
    Old,

    /// No direct upstream is newer, but some upstream is not good
    DownstreamFromOld,

    /// The asset has never been materialized
    #[serde(rename = "none")]
    Unmaterialized,
}

impl AssetStatus {
    /// All statuses, in display order
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Good,
        AssetStatus::Old,
        AssetStatus::DownstreamFromOld,
        AssetStatus::Unmaterialized,
    ];

    /// Whether this is [`AssetStatus::Good`]
    pub fn is_good(self) -> bool {
        self == AssetStatus::Good
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetStatus::Good => "good",
            AssetStatus::Old => "old",
            AssetStatus::DownstreamFromOld => "downstream-from-old",
            AssetStatus::Unmaterialized => "none",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn node_id_is_compact_json_path() {
        let key = AssetKey::new(["warehouse", "orders"]);
        assert_eq!(key.node_id().as_str(), r#"["warehouse","orders"]"#);
    }

    #[test]
    fn node_id_escapes_segments() {
        let key = AssetKey::new([r#"we"ird"#]);
        assert_eq!(key.node_id().as_str(), r#"["we\"ird"]"#);
    }

    #[rstest]
    #[case("a>b", &["a", "b"])]
    #[case("a/b/c", &["a", "b", "c"])]
    #[case(" a > b ", &["a", "b"])]
    #[case("a>>b", &["a", "b"])]
    #[case("single", &["single"])]
    #[case("s3://bucket>raw", &["s3://bucket", "raw"])]
    #[case("a>b/c", &["a", "b/c"])]
    #[case(r#"["s3://bucket"]"#, &["s3://bucket"])]
    #[case(r#" ["a b", "c>d"] "#, &["a b", "c>d"])]
    #[case("[unclosed", &["[unclosed"])]
    fn parse_user_splits_segments(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(AssetKey::parse_user(input), AssetKey::new(expected.iter().copied()));
    }

    #[test]
    fn display_path_joins_with_separator() {
        assert_eq!(AssetKey::new(["a", "b", "c"]).display_path(), "a>b>c");
        assert_eq!(AssetKey::new(["a", "b"]).to_string(), "a>b");
    }

    #[test]
    fn latest_materialization_picks_newest() {
        let mut def = AssetDefinition::new(AssetKey::new(["a"]));
        def.materializations = vec![
            Materialization::at(5.0),
            Materialization::at(9.0),
            Materialization::at(7.0),
        ];
        assert_eq!(def.latest_timestamp(), 9.0);
    }

    #[test]
    fn latest_timestamp_is_zero_without_materializations() {
        let def = AssetDefinition::new(AssetKey::new(["a"]));
        assert!(!def.is_materialized());
        assert_eq!(def.latest_timestamp(), 0.0);
    }

    #[test]
    fn timestamp_falls_back_to_start_time() {
        let mat = Materialization {
            step_stats: StepStats {
                start_time: Some(3.0),
                end_time: None,
            },
            partition: None,
            run: None,
        };
        assert_eq!(mat.timestamp(), 3.0);

        let empty = Materialization {
            step_stats: StepStats::default(),
            partition: None,
            run: None,
        };
        assert_eq!(empty.timestamp(), 0.0);
    }

    #[test]
    fn definition_deserializes_with_defaults() {
        let json = r#"{"assetKey":{"path":["a","b"]}}"#;
        let def: AssetDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.asset_key, AssetKey::new(["a", "b"]));
        assert!(def.dependencies.is_empty());
        assert!(def.materializations.is_empty());
        assert!(def.job_names.is_empty());
    }

    #[test]
    fn run_reference_variants_deserialize() {
        let json = r#"{
            "stepStats": {"startTime": 1.0, "endTime": 2.0},
            "run": {"kind": "run", "runId": "r1", "pipelineName": "daily", "mode": "default", "status": "SUCCESS"}
        }"#;
        let mat: Materialization = serde_json::from_str(json).unwrap();
        let record = mat.run_record().unwrap();
        assert_eq!(record.run_id, "r1");
        assert_eq!(record.status, RunStatus::Success);

        let json = r#"{"run": {"kind": "run-not-found", "runId": "gone"}}"#;
        let mat: Materialization = serde_json::from_str(json).unwrap();
        assert!(mat.run_record().is_none());
        assert_eq!(
            mat.run,
            Some(RunReference::RunNotFound {
                run_id: "gone".to_string()
            })
        );
    }

    #[test]
    fn status_serializes_to_wire_names() {
        let names: Vec<String> = AssetStatus::ALL
            .iter()
            .map(|s| serde_json::to_string(s).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![r#""good""#, r#""old""#, r#""downstream-from-old""#, r#""none""#]
        );
        for status in AssetStatus::ALL {
            assert_eq!(format!("\"{status}\""), serde_json::to_string(&status).unwrap());
        }
    }
}
