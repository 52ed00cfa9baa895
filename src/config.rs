//! Configuration file parser for `<config dir>/termflux/config.toml`.
//!
//! The file is optional: a missing or empty file yields `Config::default()`.
//! Unknown keys are ignored with a logged warning.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const APP_DIR_NAME: &str = "termflux";
pub const CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Could not determine a configuration directory; pass --config-dir")]
    NoConfigDir,
}

// ============================================================================
// Configuration
// ============================================================================

/// Every field is defaulted, so any subset of keys may appear in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum unread entries fetched at startup. 0 = all.
    pub fetch_limit: u32,

    /// Per-request timeout for the feed service, in seconds.
    pub request_timeout_secs: u64,

    /// Wrap width used when converting entry HTML to text.
    pub content_width: usize,

    /// Action name -> key string overrides.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_limit: 0,
            request_timeout_secs: 30,
            content_width: 100,
            keybindings: HashMap::new(),
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "fetch_limit",
    "request_timeout_secs",
    "content_width",
    "keybindings",
];

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file: defaults
    /// - Invalid TOML or wrong value types: `ConfigError::Parse`
    /// - Files over 1 MiB: `ConfigError::TooLarge`, checked before reading
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge {
                    size: meta.len(),
                    max: Self::MAX_FILE_SIZE,
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            // Removed between metadata and read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
                tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            fetch_limit = config.fetch_limit,
            overrides = config.keybindings.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Config Directory
// ============================================================================

/// Resolve the directory holding `config.toml` and `credentials.json`.
///
/// An explicit override wins; otherwise `termflux` under the platform
/// config directory.
pub fn resolve_config_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoConfigDir),
    }
}

/// Create `dir` if needed, readable by the current user only on Unix.
pub fn ensure_config_dir(dir: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)?;
    }
    #[cfg(not(unix))]
    std::fs::create_dir_all(dir)?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
