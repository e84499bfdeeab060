//! Durable recording state.

use crate::action::Action;
use serde::{Deserialize, Serialize};

/// The unit of persistence: the recording flag plus the ordered trace.
///
/// The whole struct is written to durable storage after every mutation and
/// read back when a new page context starts, so a session survives page
/// reloads. Field names are fixed by the stored document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingState {
    pub is_recording: bool,
    pub trace: Vec<Action>,
}

impl RecordingState {
    pub fn new() -> Self {
        Self::default()
    }
}
