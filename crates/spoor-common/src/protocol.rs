//! Wire protocol between capture shims, control surfaces and the recorder.
//!
//! Capture shims run inside the observed page and report DOM events and
//! page loads as JSON text frames. Control surfaces issue the four
//! recording commands. Every message type here is an exact wire contract;
//! field names and tag values must not change.

use crate::action::Action;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

fn deserialize_nullable_string_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, Option<String>> = HashMap::deserialize(deserializer)?;
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| v.map(|val| (k, val)))
        .collect())
}

/// Snapshot of the DOM element an input event targeted, as seen by the
/// shim at capture time. Attributes with null values are dropped during
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    #[serde(default)]
    pub tag: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string_map")]
    pub attributes: HashMap<String, String>,
}

/// Input events observed while the shim's listeners are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InputEvent {
    Click {
        target: ElementInfo,
        #[serde(default)]
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    KeyDown {
        target: ElementInfo,
        key: String,
        code: String,
        #[serde(default)]
        ctrl_key: bool,
        #[serde(default)]
        shift_key: bool,
        #[serde(default)]
        alt_key: bool,
        #[serde(default)]
        meta_key: bool,
    },
}

/// Page lifecycle announcements from the shim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PageSignal {
    /// A page finished loading and its capture shim is ready. Starts a new
    /// page context on the recorder side.
    PageLoaded { url: String },
}

/// Any frame a capture shim can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureMessage {
    Page(PageSignal),
    Input(InputEvent),
}

/// Listener control sent to shims. `Observe` asks the shim to install its
/// click and keydown listeners, `Unobserve` to remove them, so idle pages
/// generate no event traffic at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ObserverControl {
    Observe,
    Unobserve,
}

/// Recording commands, exactly the four messages a control surface sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    StartRecording,
    StopRecording,
    DownloadActionTrace,
    GetStatus,
}

/// Acknowledgement payloads returned to the issuing control surface.
/// `downloadActionTrace` is fire-and-forget and has no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandAck {
    Status { status: String },
    #[serde(rename_all = "camelCase")]
    State { is_recording: bool, trace: Vec<Action> },
}
