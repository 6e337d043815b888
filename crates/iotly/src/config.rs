//! CLI-owned configuration: TOML file plus `IOTLY_` environment
//! variables, with CLI flags taking priority over both.
//!
//! Core never sees these types; it receives a pre-built client and a
//! `SyncConfig`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use iotly_api::{RegistryClient, TransportConfig};
use iotly_core::SyncConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config struct ───────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Registry base URL (e.g. "http://localhost:5000").
    pub registry_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Steady cadence in seconds (silent background refresh).
    #[serde(default = "default_steady")]
    pub steady_interval_secs: u64,

    /// Recovery cadence in seconds (reconnect attempts while degraded).
    #[serde(default = "default_recovery")]
    pub recovery_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: None,
            timeout_secs: default_timeout(),
            steady_interval_secs: default_steady(),
            recovery_interval_secs: default_recovery(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_steady() -> u64 {
    2
}
fn default_recovery() -> u64 {
    3
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "iotly", "iotly")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("iotly");
            p.push("config.toml");
            p
        })
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("IOTLY_"));

    let config: Config = figment.extract().map_err(Box::new)?;
    Ok(config)
}

// ── Resolution ───────────────────────────────────────────────────────

/// Fully resolved runtime settings: config file merged with CLI flags.
pub struct Settings {
    pub client: RegistryClient,
    pub sync: SyncConfig,
}

/// Build runtime settings from the config chain (flag > env > file).
pub fn resolve(global: &GlobalOpts) -> Result<Settings, CliError> {
    let cfg = load_config()?;

    let url_str = global
        .registry
        .clone()
        .or(cfg.registry_url)
        .ok_or_else(|| CliError::NoRegistry {
            path: config_path().display().to_string(),
        })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "registry".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let transport = TransportConfig {
        timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.timeout_secs)),
    };

    let client = RegistryClient::new(url, &transport).map_err(iotly_core::CoreError::from)?;

    let sync = SyncConfig {
        steady_interval: Duration::from_secs(cfg.steady_interval_secs),
        recovery_interval: Duration::from_secs(cfg.recovery_interval_secs),
    };

    Ok(Settings { client, sync })
}
