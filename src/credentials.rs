//! Credential storage for the Miniflux instance.
//!
//! Credentials live in `credentials.json` inside the config directory as
//! `{ "instance": "...", "api_key": "..." }`. The `TERMFLUX_INSTANCE` and
//! `TERMFLUX_API_KEY` environment variables, when both set, take precedence.

use crate::util::{validate_instance_url, UrlValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;
use thiserror::Error;

pub const CREDENTIALS_FILE: &str = "credentials.json";

const ENV_INSTANCE: &str = "TERMFLUX_INSTANCE";
const ENV_API_KEY: &str = "TERMFLUX_API_KEY";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Failed to access credentials file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed credentials file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidInstance(#[from] UrlValidationError),

    #[error("API key must not be empty")]
    EmptyApiKey,
}

/// Instance URL and API key.
///
/// `Debug` output masks the key.
#[derive(Clone)]
pub struct Credentials {
    pub instance_url: String,
    pub api_key: SecretString,
}

impl Credentials {
    pub fn new(instance_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            api_key: SecretString::from(api_key.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("instance_url", &self.instance_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// On-disk shape.
#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    instance: String,
    api_key: String,
}

/// Load credentials, preferring the environment over the file.
///
/// # Arguments
///
/// * `path` - Location of `credentials.json`
///
/// # Returns
///
/// `Ok(None)` when neither the environment nor the file has them, an error
/// when the file exists but cannot be read or parsed.
pub fn load_credentials(path: &Path) -> Result<Option<Credentials>, CredentialsError> {
    load_credentials_with(path, |key| std::env::var(key).ok())
}

/// [`load_credentials`] with the environment lookup supplied by the caller.
fn load_credentials_with<F>(path: &Path, env: F) -> Result<Option<Credentials>, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(creds) = from_env(env) {
        tracing::debug!("Using credentials from environment");
        return Ok(Some(creds));
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No credentials file");
            return Ok(None);
        }
        Err(e) => return Err(CredentialsError::Io(e)),
    };

    let stored: StoredCredentials = serde_json::from_str(&content)?;
    tracing::info!(path = %path.display(), instance = %stored.instance, "Loaded credentials");
    Ok(Some(Credentials::new(stored.instance, stored.api_key)))
}

/// Both variables must be set and non-empty.
fn from_env<F>(env: F) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let instance = env(ENV_INSTANCE).filter(|s| !s.is_empty())?;
    let api_key = env(ENV_API_KEY).filter(|s| !s.is_empty())?;
    Some(Credentials::new(instance, api_key))
}

/// Write credentials atomically (temp file + rename) with user-only
/// permissions on Unix.
pub fn save_credentials(path: &Path, creds: &Credentials) -> Result<(), CredentialsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let stored = StoredCredentials {
        instance: creds.instance_url.clone(),
        api_key: creds.api_key.expose_secret().to_string(),
    };
    let json = serde_json::to_vec_pretty(&stored)?;

    let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write_result = (|| -> std::io::Result<()> {
        let mut file = options.open(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), "Saved credentials");
    Ok(())
}

/// Ask for the instance URL and API key on the given streams.
///
/// The URL is validated and normalised before returning.
pub fn prompt_credentials<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Credentials, CredentialsError> {
    let instance = prompt_line(input, output, "instance url ")?;
    let instance = validate_instance_url(&instance)?;

    let api_key = prompt_line(input, output, "api key ")?;
    if api_key.is_empty() {
        return Err(CredentialsError::EmptyApiKey);
    }

    Ok(Credentials::new(instance, api_key))
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> std::io::Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
