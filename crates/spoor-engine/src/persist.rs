//! Durable persistence for the recording state.
//!
//! The engine writes the full [`RecordingState`] after every mutation and
//! reads it back when a new page context starts. Writes are idempotent
//! overwrites, so the store needs no log or merge logic. A failed write is
//! reported as a [`PersistResult`] and never escalated: the in-memory
//! state stays authoritative for the current page context.

use async_trait::async_trait;
use spoor_common::state::RecordingState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of one persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistResult {
    Ok,
    Failed(String),
}

impl PersistResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, PersistResult::Ok)
    }
}

/// External durable collaborator holding the serialized recording state.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the last persisted state. `Ok(None)` when nothing is stored.
    async fn load(&self) -> Result<Option<RecordingState>, StoreError>;

    /// Overwrite the stored state.
    async fn save(&self, state: &RecordingState) -> Result<(), StoreError>;
}

/// File-backed store: one pretty-printed JSON document at a fixed path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn load(&self) -> Result<Option<RecordingState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let state = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    async fn save(&self, state: &RecordingState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

/// In-memory store used by tests and by hosts running without durable
/// storage. Write failures can be injected to exercise degraded paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<Option<RecordingState>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `load` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of completed writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The last successfully written state.
    pub fn stored(&self) -> Option<RecordingState> {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self) -> Result<Option<RecordingState>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated read failure".to_string()));
        }
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &RecordingState) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }
        *self.state.lock().unwrap() = Some(state.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
