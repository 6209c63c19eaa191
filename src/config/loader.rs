use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use super::types::Config;
use super::validation::Validate;

pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Loader for the per-user config file, creating its directory.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("yail-live");

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Loader for an explicit file. Its directory must exist.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the file, writing defaults first when it does not exist yet.
    ///
    /// A file that no longer parses is kept as `config.toml.backup` and
    /// replaced by defaults. Invalid values are reset and written back.
    pub fn load_or_create(&self) -> Result<Config> {
        if !self.config_path.exists() {
            let default_config = Config::default();
            self.save(&default_config)?;
            info!("Wrote default config to {:?}", self.config_path);
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        let mut config: Config = match toml::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                let backup_path = self.config_path.with_extension("toml.backup");
                fs::write(&backup_path, &content).context("Failed to write backup")?;

                error!(
                    "Config file corrupted: {}. Backup saved to {:?}. Using defaults.",
                    e, backup_path
                );

                let default = Config::default();
                self.save(&default)?;
                return Ok(default);
            }
        };

        config.validate();

        let current_toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        if content.trim() != current_toml.trim() {
            self.save(&config)?;
        }

        Ok(config)
    }

    /// Reads `path` without touching it. Parse errors are reported.
    pub fn load_from(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate();
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, toml_string).context("Failed to write config file")?;

        Ok(())
    }
}
