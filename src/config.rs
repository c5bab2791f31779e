//! Service configuration: defaults, YAML loading and environment overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{PeakscopeError, Result};

/// Default upload size cap: 16 MiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Deployment profile. Only affects the default log level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(self) -> LevelFilter {
        match self {
            Profile::Development => LevelFilter::Debug,
            Profile::Production => LevelFilter::Info,
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(format!("unknown profile '{other}' (expected development or production)")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the HTTP service.
///
/// Missing fields in a YAML file fall back to [`Default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on. Default: `127.0.0.1:5000`.
    pub bind_addr: String,
    /// Maximum accepted request body in bytes. Default: 16 MiB.
    pub max_content_length: usize,
    /// Directory uploaded files are saved into. Created on demand. Default: `static/uploads`.
    pub upload_folder: PathBuf,
    /// Accepted file extensions, lowercase without the dot. Default: `csv`, `txt`.
    pub allowed_extensions: Vec<String>,
    /// Deployment profile. Default: `development`.
    pub profile: Profile,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            upload_folder: PathBuf::from("static").join("uploads"),
            allowed_extensions: vec!["csv".to_string(), "txt".to_string()],
            profile: Profile::Development,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PeakscopeError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&text).map_err(|e| PeakscopeError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `PEAKSCOPE_*` environment variables on top of the current values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("PEAKSCOPE_BIND") {
            self.bind_addr = bind;
        }
        if let Some(raw) = lookup("PEAKSCOPE_MAX_CONTENT_LENGTH") {
            self.max_content_length = raw.trim().parse().map_err(|_| PeakscopeError::Config {
                path: "PEAKSCOPE_MAX_CONTENT_LENGTH".to_string(),
                message: format!("expected a byte count, got '{raw}'"),
            })?;
        }
        if let Some(folder) = lookup("PEAKSCOPE_UPLOAD_FOLDER") {
            self.upload_folder = PathBuf::from(folder);
        }
        if let Some(raw) = lookup("PEAKSCOPE_PROFILE") {
            self.profile = raw.parse().map_err(|message| PeakscopeError::Config {
                path: "PEAKSCOPE_PROFILE".to_string(),
                message,
            })?;
        }
        Ok(())
    }
}
