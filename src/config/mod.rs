use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::countdown::{DEFAULT_RESEND_SECONDS, DEFAULT_SUFFIX};
use crate::theme::ThemeMode;

fn default_resend_seconds() -> u32 {
    DEFAULT_RESEND_SECONDS
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Saved theme preference
    #[serde(default)]
    pub theme: ThemeMode,

    /// Seconds before a verification code may be resent
    #[serde(default = "default_resend_seconds")]
    pub resend_seconds: u32,

    /// Text shown after the countdown time
    #[serde(default = "default_suffix")]
    pub countdown_suffix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            resend_seconds: default_resend_seconds(),
            countdown_suffix: default_suffix(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("otpgate");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`, writing defaults if it is missing or unreadable
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => return Ok(config.sanitized()),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.clone().sanitized())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// A zero countdown would never let the user resend
    fn sanitized(mut self) -> Self {
        if self.resend_seconds == 0 {
            tracing::warn!("resend_seconds must be positive, using {}", DEFAULT_RESEND_SECONDS);
            self.resend_seconds = DEFAULT_RESEND_SECONDS;
        }
        self
    }
}
