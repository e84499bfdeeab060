//! Recorded user actions.
//!
//! An [`Action`] is one captured interaction. Serialized actions are
//! internally tagged (`{"type": "click", ...}`) and keep the timestamp as
//! the last field, which is the layout the exported trace file uses.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of characters of element text captured with a click.
pub const CLICK_TEXT_LIMIT: usize = 50;

/// Modifier keys held down during a keyboard action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// One captured user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Click {
        selector: String,
        text: String,
        timestamp: u64,
    },
    #[serde(rename_all = "camelCase")]
    Keyboard {
        selector: String,
        key: String,
        code: String,
        ctrl_key: bool,
        shift_key: bool,
        alt_key: bool,
        meta_key: bool,
        timestamp: u64,
    },
    Navigate {
        url: String,
        timestamp: u64,
    },
}

impl Action {
    /// Click on the element located by `selector`. `text` is the visible
    /// text of the target, truncated to [`CLICK_TEXT_LIMIT`] characters.
    pub fn click(selector: impl Into<String>, text: &str) -> Self {
        Action::Click {
            selector: selector.into(),
            text: text.chars().take(CLICK_TEXT_LIMIT).collect(),
            timestamp: now_millis(),
        }
    }

    /// Key press on the element located by `selector`.
    pub fn keyboard(
        selector: impl Into<String>,
        key: impl Into<String>,
        code: impl Into<String>,
        modifiers: Modifiers,
    ) -> Self {
        Action::Keyboard {
            selector: selector.into(),
            key: key.into(),
            code: code.into(),
            ctrl_key: modifiers.ctrl,
            shift_key: modifiers.shift,
            alt_key: modifiers.alt,
            meta_key: modifiers.meta,
            timestamp: now_millis(),
        }
    }

    /// Navigation to `url`. Appended by the engine when a session starts
    /// and when a loaded page resumes one, never derived from a DOM event.
    pub fn navigate(url: impl Into<String>) -> Self {
        Action::Navigate {
            url: url.into(),
            timestamp: now_millis(),
        }
    }

    /// Capture time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        match self {
            Action::Click { timestamp, .. }
            | Action::Keyboard { timestamp, .. }
            | Action::Navigate { timestamp, .. } => *timestamp,
        }
    }
}

/// Current wall clock in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_truncates_long_text() {
        let text = "x".repeat(80);
        let action = Action::click("#go", &text);
        match action {
            Action::Click { text, .. } => assert_eq!(text.len(), CLICK_TEXT_LIMIT),
            _ => panic!("expected click"),
        }
    }

    #[test]
    fn test_click_truncates_by_characters_not_bytes() {
        let text = "é".repeat(60);
        let action = Action::click("#go", &text);
        match action {
            Action::Click { text, .. } => {
                assert_eq!(text.chars().count(), CLICK_TEXT_LIMIT);
            }
            _ => panic!("expected click"),
        }
    }

    #[test]
    fn test_constructors_stamp_timestamps() {
        let before = now_millis();
        let action = Action::navigate("https://example.com");
        assert!(action.timestamp() >= before);
        assert!(action.timestamp() <= now_millis());
    }
}
