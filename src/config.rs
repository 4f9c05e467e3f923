//! Layered configuration for the `dealboard` CLI.
//!
//! Settings are merged in this order, later layers winning:
//! 1. `dealboard.toml` (explicit `--config`, else `./dealboard.toml`, else
//!    `<config_dir>/dealboard/config.toml`, else built-in defaults)
//! 2. Environment variables (`DEALBOARD_*`, `.env` honoured by the binary)
//! 3. CLI flags
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [commenter]
//! name = "Sales Team"
//! role = "sales"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::Commenter;

pub const CONFIG_FILE_NAME: &str = "dealboard.toml";

pub const ENV_API_URL: &str = "DEALBOARD_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DEALBOARD_TIMEOUT_SECS";
pub const ENV_COMMENTER_NAME: &str = "DEALBOARD_COMMENTER_NAME";
pub const ENV_COMMENTER_ROLE: &str = "DEALBOARD_COMMENTER_ROLE";
pub const ENV_LOG: &str = "DEALBOARD_LOG";

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Backend root, without the `/api/sprint` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Author recorded on comments posted from this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommenterSection {
    #[serde(default = "default_commenter_name")]
    pub name: String,
    #[serde(default = "default_commenter_role")]
    pub role: Option<String>,
}

fn default_commenter_name() -> String {
    "Sales Team".to_string()
}

fn default_commenter_role() -> Option<String> {
    Some("sales".to_string())
}

impl Default for CommenterSection {
    fn default() -> Self {
        Self {
            name: default_commenter_name(),
            role: default_commenter_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// The complete dealboard.toml configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DealboardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub commenter: CommenterSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DealboardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse dealboard.toml")
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize dealboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `DEALBOARD_*` overrides read through `lookup`. Returns a
    /// warning for each value that could not be used.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warnings.push(format!(
                    "Ignoring {}='{}': expected a whole number of seconds",
                    ENV_TIMEOUT_SECS, raw
                )),
            }
        }
        if let Some(name) = lookup(ENV_COMMENTER_NAME) {
            self.commenter.name = name;
        }
        if let Some(role) = lookup(ENV_COMMENTER_ROLE) {
            self.commenter.role = Some(role);
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }

        warnings
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if url.is_empty() {
            warnings.push("api.base_url is empty".to_string());
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request would time out".to_string());
        }
        if self.commenter.name.trim().is_empty() {
            warnings.push("commenter.name is blank".to_string());
        }
        if self.logging.level.trim().is_empty() {
            warnings.push("logging.level is blank".to_string());
        }

        warnings
    }
}

/// Where a config file is looked for when `--config` is not given.
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("dealboard").join("config.toml"));
    }
    paths
}

/// Effective configuration: file, environment and CLI merged.
#[derive(Debug, Clone)]
pub struct DealboardConfig {
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
    pub toml: DealboardToml,
    /// CLI override: backend URL
    pub cli_api_url: Option<String>,
    /// CLI override: debug logging
    pub verbose: bool,
    /// CLI override: skip confirmations
    pub yes: bool,
    env_warnings: Vec<String>,
}

impl DealboardConfig {
    /// Load from `explicit` or the first existing default location, then
    /// apply the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, &default_locations(), |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with the search path and environment supplied.
    pub fn load_with<F>(explicit: Option<&Path>, locations: &[PathBuf], lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => locations.iter().find(|p| p.exists()).cloned(),
        };
        let mut toml = match &source {
            Some(path) => DealboardToml::load(path)?,
            None => DealboardToml::default(),
        };
        let env_warnings = toml.apply_env(lookup);

        Ok(Self {
            source,
            toml,
            cli_api_url: None,
            verbose: false,
            yes: false,
            env_warnings,
        })
    }

    /// Apply CLI flags.
    pub fn with_cli_args(mut self, api_url: Option<String>, verbose: bool, yes: bool) -> Self {
        self.cli_api_url = api_url;
        self.verbose = verbose;
        self.yes = yes;
        self
    }

    /// Backend URL (CLI → env → file → default).
    pub fn base_url(&self) -> &str {
        self.cli_api_url
            .as_deref()
            .unwrap_or(&self.toml.api.base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs)
    }

    pub fn commenter(&self) -> Commenter {
        Commenter {
            name: self.toml.commenter.name.trim().to_string(),
            role: self
                .toml
                .commenter
                .role
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
        }
    }

    /// Default log filter; `--verbose` forces `debug`.
    pub fn log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.toml.logging.level
        }
    }

    pub fn log_format(&self) -> LogFormat {
        self.toml.logging.format
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.env_warnings.clone();
        warnings.extend(self.toml.validate());
        if let Some(url) = &self.cli_api_url
            && url.trim().is_empty()
        {
            warnings.push("--api-url is empty".to_string());
        }
        warnings
    }
}
