use super::types::{CompanionConfig, EditorConfig, LoggingConfig, TransportConfig};
use crate::session::deletion::DEFAULT_THRESHOLD;

pub(super) const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;

pub(super) fn default_companion_ip() -> String {
    "127.0.0.1".to_string()
}

pub(super) fn default_companion_port() -> u16 {
    8001
}

pub(super) fn default_timeout_ms() -> u64 {
    5000
}

pub(super) fn default_deletion_threshold() -> usize {
    DEFAULT_THRESHOLD
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            ip: default_companion_ip(),
            port: default_companion_port(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            deletion_threshold: default_deletion_threshold(),
            strict_assembly: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
