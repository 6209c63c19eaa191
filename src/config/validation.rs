use tracing::warn;

use super::defaults::*;
use super::types::{CompanionConfig, Config, EditorConfig, LoggingConfig, TransportConfig};

/// Replaces out-of-range settings with their defaults.
pub trait Validate {
    fn validate(&mut self);
}

impl Validate for CompanionConfig {
    fn validate(&mut self) {
        if self.ip.trim().is_empty() {
            warn!("Invalid companion IP: empty string. Using default: {}", default_companion_ip());
            self.ip = default_companion_ip();
        }

        if self.port == 0 {
            warn!("Invalid companion port: 0. Using default: {}", default_companion_port());
            self.port = default_companion_port();
        }
    }
}

impl Validate for TransportConfig {
    fn validate(&mut self) {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            warn!(
                "Invalid timeout_ms: {}. Using default: {}",
                self.timeout_ms,
                default_timeout_ms()
            );
            self.timeout_ms = default_timeout_ms();
        }
    }
}

impl Validate for EditorConfig {
    fn validate(&mut self) {
        if self.deletion_threshold == 0 {
            warn!(
                "Invalid deletion_threshold: 0. Using default: {}",
                default_deletion_threshold()
            );
            self.deletion_threshold = default_deletion_threshold();
        }
    }
}

impl Validate for LoggingConfig {
    fn validate(&mut self) {
        if self.level.trim().is_empty() {
            warn!("Invalid log level: empty string. Using default: {}", default_log_level());
            self.level = default_log_level();
        }
    }
}

impl Validate for Config {
    fn validate(&mut self) {
        self.companion.validate();
        self.transport.validate();
        self.editor.validate();
        self.logging.validate();
    }
}
