//! User configuration for the `parprog` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProgressError, Result};
use crate::registry::{InterruptAction, RegistryConfig};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Milliseconds between redraws.
    pub refresh_interval_ms: u64,
    /// Files read at once.
    pub jobs: usize,
    /// Exit the process when Ctrl-C is pressed in the display.
    pub exit_on_interrupt: bool,
    /// Exit code used on Ctrl-C; must be non-zero.
    pub interrupt_exit_code: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            jobs: 3,
            exit_on_interrupt: true,
            interrupt_exit_code: 1,
        }
    }
}

impl Config {
    /// `<config dir>/parprog/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parprog").join("config.toml"))
    }

    /// Load from `path`, or from [`Config::default_path`] if that file
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        let text = fs::read_to_string(&path)
            .map_err(|e| ProgressError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
            .map_err(|e| ProgressError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| ProgressError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(ProgressError::Config(
                "refresh_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(ProgressError::Config("jobs must be at least 1".to_string()));
        }
        if self.interrupt_exit_code == 0 {
            return Err(ProgressError::Config(
                "interrupt_exit_code must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            on_interrupt: if self.exit_on_interrupt {
                InterruptAction::Exit(self.interrupt_exit_code)
            } else {
                InterruptAction::Detach
            },
        }
    }
}
