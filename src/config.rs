//! Settings for the companion, the transport and the editor, read from
//! `<config dir>/yail-live/config.toml`.

mod defaults;

mod types;
pub use types::{CompanionConfig, Config, EditorConfig, LoggingConfig, TransportConfig};

mod loader;
pub use loader::ConfigLoader;

mod validation;
pub use validation::Validate;
