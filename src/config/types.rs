use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub companion: CompanionConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the companion REPL server listens, and where clients connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompanionConfig {
    #[serde(default = "default_companion_ip")]
    pub ip: String,

    #[serde(default = "default_companion_port")]
    pub port: u16,
}

impl CompanionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransportConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EditorConfig {
    /// Deleting this many blocks or more asks for confirmation.
    #[serde(default = "default_deletion_threshold")]
    pub deletion_threshold: usize,

    #[serde(default)]
    pub strict_assembly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
