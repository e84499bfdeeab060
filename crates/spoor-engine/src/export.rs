//! Trace export.

use crate::persist::DurableStore;
use crate::store::TraceStore;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Fixed name of the exported artifact.
pub const ARTIFACT_NAME: &str = "action_trace.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes trace snapshots to `action_trace.json` and resets the store so
/// the next session starts clean.
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    /// Where the artifact is written. A later export overwrites it.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(ARTIFACT_NAME)
    }

    /// Write the current trace as a pretty-printed JSON array and clear
    /// the store. Returns `Ok(None)` and writes nothing when the trace is
    /// empty. The recording flag is not touched, and the store is only
    /// cleared once the artifact is on disk.
    pub async fn export<S: DurableStore>(
        &self,
        store: &mut TraceStore<S>,
    ) -> Result<Option<PathBuf>, ExportError> {
        // Snapshot first so nothing appended mid-export can shear the array.
        let snapshot = store.snapshot();
        if snapshot.is_empty() {
            info!("nothing to export, trace is empty");
            return Ok(None);
        }

        let data = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.artifact_path();
        tokio::fs::write(&path, data).await?;

        store.clear().await;
        info!("saved {} actions to {}", snapshot.len(), path.display());
        Ok(Some(path))
    }
}
