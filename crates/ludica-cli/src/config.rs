//! Configuration file management for ludica.
//!
//! Provides a TOML-based config file at `~/.config/ludica/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.
//!
//! The file never stores the API credential itself, only the names of the
//! environment variables to read it from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ludica_core::ClientConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Environment variables consulted for the API key, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_env: Vec<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the ludica config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/ludica` or `~/.config/ludica`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("ludica");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ludica")
}

/// Return the path to the ludica config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load the config file at `path`, or `None` if it does not exist.
///
/// A file that exists but fails to parse is an error.
pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

/// The config `ludica init` writes: every setting spelled out with its default.
pub fn default_config_file() -> ConfigFile {
    let defaults = ClientConfig::default();
    ConfigFile {
        model: ModelSection {
            endpoint: Some(defaults.endpoint),
            name: Some(defaults.model),
            timeout_secs: Some(defaults.timeout.as_secs()),
            temperature: None,
            credential_env: defaults.credential_vars,
        },
    }
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Settings given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolve configuration using the chain: CLI flag > env var > config file > default.
///
/// - Model: `--model` > `LUDICA_MODEL` > `model.name` > default
/// - Endpoint: `--endpoint` > `LUDICA_ENDPOINT` > `model.endpoint` > default
/// - Timeout: `--timeout` > `LUDICA_TIMEOUT_SECS` > `model.timeout_secs` > default
pub fn resolve(cli: &CliOverrides) -> Result<ClientConfig> {
    resolve_with_file(cli, load_config_from(&config_path())?)
}

fn resolve_with_file(cli: &CliOverrides, file: Option<ConfigFile>) -> Result<ClientConfig> {
    let file = file.unwrap_or_default().model;
    let mut config = ClientConfig::default();

    if let Some(model) = cli
        .model
        .clone()
        .or_else(|| env_nonempty("LUDICA_MODEL"))
        .or(file.name)
    {
        config.model = model;
    }

    if let Some(endpoint) = cli
        .endpoint
        .clone()
        .or_else(|| env_nonempty("LUDICA_ENDPOINT"))
        .or(file.endpoint)
    {
        config.endpoint = endpoint.trim_end_matches('/').to_string();
    }

    let timeout_secs = match (cli.timeout_secs, env_nonempty("LUDICA_TIMEOUT_SECS")) {
        (Some(secs), _) => Some(secs),
        (None, Some(raw)) => Some(
            raw.parse::<u64>()
                .with_context(|| format!("LUDICA_TIMEOUT_SECS is not a number: {raw:?}"))?,
        ),
        (None, None) => file.timeout_secs,
    };
    if let Some(secs) = timeout_secs {
        anyhow::ensure!(secs > 0, "timeout must be at least one second");
        config.timeout = Duration::from_secs(secs);
    }

    config.temperature = file.temperature;
    if !file.credential_env.is_empty() {
        config.credential_vars = file.credential_env;
    }

    Ok(config)
}

fn env_nonempty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
