//! In-memory trace store with write-through persistence.

use crate::persist::{DurableStore, PersistResult, StoreError};
use spoor_common::action::Action;
use spoor_common::state::RecordingState;
use tracing::warn;

/// The ordered action trace plus the recording flag, written through to
/// the durable collaborator after every mutation. Reads are served from
/// memory; the persisted copy only matters at context start.
pub struct TraceStore<S: DurableStore> {
    state: RecordingState,
    storage: S,
}

impl<S: DurableStore> TraceStore<S> {
    pub fn new(storage: S) -> Self {
        Self { state: RecordingState::default(), storage }
    }

    /// Append one action at the end of the trace and persist. A failed
    /// write is logged and reported, never escalated: the in-memory trace
    /// stays authoritative for this page context.
    pub async fn append(&mut self, action: Action) -> PersistResult {
        self.state.trace.push(action);
        self.persist().await
    }

    /// Drop all recorded actions, leaving the recording flag untouched.
    pub async fn clear(&mut self) -> PersistResult {
        self.state.trace.clear();
        self.persist().await
    }

    /// Flip the recording flag and persist.
    pub async fn set_recording(&mut self, recording: bool) -> PersistResult {
        self.state.is_recording = recording;
        self.persist().await
    }

    /// Replace the in-memory state with a previously persisted one. Runs
    /// once per page context, before any capture; does not persist.
    pub fn restore(&mut self, state: RecordingState) {
        self.state = state;
    }

    /// Read the last persisted state from the durable collaborator.
    pub async fn load_persisted(&self) -> Result<Option<RecordingState>, StoreError> {
        self.storage.load().await
    }

    /// Copy of the trace in arrival order.
    pub fn snapshot(&self) -> Vec<Action> {
        self.state.trace.clone()
    }

    /// The full current state, as reported by `getStatus`.
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording
    }

    pub fn len(&self) -> usize {
        self.state.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.trace.is_empty()
    }

    async fn persist(&self) -> PersistResult {
        match self.storage.save(&self.state).await {
            Ok(()) => PersistResult::Ok,
            Err(e) => {
                warn!("persisting recording state failed, keeping in-memory copy: {}", e);
                PersistResult::Failed(e.to_string())
            }
        }
    }
}
