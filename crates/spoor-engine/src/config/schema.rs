use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default WebSocket port capture shims connect to.
pub const DEFAULT_PORT: u16 = 9010;

/// Root configuration. Every section has a working default, so a missing
/// or partial config file is never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoorConfig {
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub relay: RelayConfig,
}

/// Where the durable recording state lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// State document path. Defaults to `~/.spoor/state.json`.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Effective state file path.
    pub fn state_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".spoor")
                .join("state.json")
        })
    }
}

/// Where exported traces are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory for `action_trace.json`. Defaults to the current
    /// working directory.
    pub dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Effective export directory.
    pub fn output_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Capture relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}
