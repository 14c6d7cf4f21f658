//! JSON Lines snapshot files.
//!
//! Each non-blank line holds one serialized [`AssetDefinition`]. Lines that
//! fail to parse, or define an asset with an empty key, are skipped with a
//! [`LoadWarning`]; one bad line never fails the whole load.

use super::{AssetSource, LoadWarning, Snapshot};
use crate::domain::AssetDefinition;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Snapshot source backed by a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    /// Read snapshots from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AssetSource for JsonlSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let file = File::open(&self.path).await.map_err(|e| Error::Snapshot {
            path: self.path.clone(),
            message: match e.kind() {
                ErrorKind::NotFound => "file not found".to_string(),
                _ => e.to_string(),
            },
        })?;

        let snapshot = read_snapshot(BufReader::new(file)).await?;
        for warning in &snapshot.warnings {
            tracing::warn!(path = %self.path.display(), "{warning}");
        }
        tracing::debug!(
            path = %self.path.display(),
            definitions = snapshot.definitions.len(),
            skipped = snapshot.warnings.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read a snapshot from buffered JSONL input.
///
/// # Errors
///
/// Returns `Error::Io` if reading fails; malformed lines become warnings.
pub(crate) async fn read_snapshot<R>(reader: R) -> Result<Snapshot>
where
    R: AsyncBufRead + Unpin,
{
    let mut snapshot = Snapshot::default();
    let mut lines = reader.split(b'\n');
    let mut line_number = 0;

    // Raw bytes per line: invalid UTF-8 is a bad record, not a read failure.
    while let Some(mut line) = lines.next_segment().await? {
        line_number += 1;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<AssetDefinition>(&line) {
            Ok(definition) if definition.asset_key.path.is_empty() => {
                snapshot
                    .warnings
                    .push(LoadWarning::EmptyAssetKey { line_number });
            }
            Ok(definition) => snapshot.definitions.push(definition),
            Err(e) => snapshot.warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    Ok(snapshot)
}
