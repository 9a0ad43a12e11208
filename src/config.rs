//! Configuration management for zabbix2opsgenie
//!
//! This module defines the `Config` struct that holds every setting the
//! forwarder reads at startup. The on-disk format is the flat `key=value`
//! file shared with the rest of the OpsGenie integration; it is parsed into
//! a [`Properties`] provider and layered over the built-in defaults with
//! `figment`.

use figment::{
    providers::Serialized,
    value::{Dict, Map, Value},
    Figment, Metadata, Profile, Provider,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the integration installs its configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/opsgenie/conf/opsgenie-integration.conf";

/// Keys whose values are interpreted as booleans. Only the exact string
/// `"true"` is truthy.
const BOOLEAN_KEYS: &[&str] = &["useMarid", "http.server.enabled", "https.server.enabled"];

const TIMEOUT_KEY: &str = "timeout";

const LOG_FILE_KEY: &str = "zabbix2opsgenie.logFile";

/// Errors raised while loading configuration or setting up logging.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration line {line_number}: `{line}` (expected key=value)")]
    MalformedLine { line_number: usize, line: String },

    #[error("invalid timeout `{0}`: expected a whole number of seconds")]
    InvalidTimeout(String),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extract(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// The main configuration struct for the forwarder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Default OpsGenie integration API key.
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Base URL of the OpsGenie API.
    #[serde(rename = "opsgenie.api.url")]
    pub api_url: String,
    /// Route alerts through the local Marid relay instead of the cloud API.
    #[serde(rename = "useMarid")]
    pub use_relay: bool,
    /// Serve the relay over plaintext HTTP.
    #[serde(rename = "http.server.enabled")]
    pub http_enabled: bool,
    #[serde(rename = "http.server.host")]
    pub http_host: String,
    #[serde(rename = "http.server.port")]
    pub http_port: String,
    /// Serve the relay over HTTPS.
    #[serde(rename = "https.server.enabled")]
    pub https_enabled: bool,
    #[serde(rename = "https.server.host")]
    pub https_host: String,
    #[serde(rename = "https.server.port")]
    pub https_port: String,
    /// Total time budget for cloud delivery, in seconds.
    pub timeout: u64,
    /// Log level name.
    pub logger: String,
    /// File to append log output to. Logs go to stderr when unset.
    #[serde(rename = "zabbix2opsgenie.logFile")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration from `config_path`, layered over the defaults.
    ///
    /// A missing file is not an error: the defaults are returned unchanged.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let properties = Properties::load(config_path)?;
        Self::from_properties(properties)
    }

    /// Builds a configuration from already-parsed properties.
    pub fn from_properties(properties: Properties) -> Result<Self, ConfigError> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(properties)
            .extract()?;
        Ok(config)
    }

    /// Returns every setting as a `key=value` pair, in file-key form.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.api_key.clone()),
            ("opsgenie.api.url", self.api_url.clone()),
            ("useMarid", self.use_relay.to_string()),
            ("http.server.enabled", self.http_enabled.to_string()),
            ("http.server.host", self.http_host.clone()),
            ("http.server.port", self.http_port.clone()),
            ("https.server.enabled", self.https_enabled.to_string()),
            ("https.server.host", self.https_host.clone()),
            ("https.server.port", self.https_port.clone()),
            ("timeout", self.timeout.to_string()),
            ("logger", self.logger.clone()),
            (
                "zabbix2opsgenie.logFile",
                self.log_file
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }

    /// Writes the effective configuration to the debug log.
    pub fn log_debug(&self) {
        tracing::debug!("Config:");
        for (key, value) in self.entries() {
            tracing::debug!("{}={}", key, value);
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.opsgenie.com".to_string(),
            use_relay: false,
            http_enabled: false,
            http_host: String::new(),
            http_port: String::new(),
            https_enabled: false,
            https_host: String::new(),
            https_port: String::new(),
            timeout: 60,
            logger: "info".to_string(),
            log_file: None,
        }
    }
}

/// The raw contents of a `key=value` configuration file.
///
/// Later occurrences of a key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Reads and parses the file at `path`. A missing file yields no entries.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses `key=value` lines. Blank lines and `#` comments are skipped.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();
        for (index, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::MalformedLine {
                line_number: index + 1,
                line: line.to_string(),
            })?;
            let (key, value) = (key.trim(), value.trim());

            if key == TIMEOUT_KEY && value.parse::<u64>().is_err() {
                return Err(ConfigError::InvalidTimeout(value.to_string()));
            }
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn typed_value(key: &str, raw: &str) -> Value {
        if BOOLEAN_KEYS.contains(&key) {
            return Value::from(raw == "true");
        }
        if key == TIMEOUT_KEY {
            if let Ok(seconds) = raw.parse::<u64>() {
                return Value::from(seconds);
            }
        }
        Value::from(raw.to_string())
    }
}

impl Provider for Properties {
    fn metadata(&self) -> Metadata {
        Metadata::named("Integration Configuration File")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        // An empty log file setting means "not set": log to stderr.
        let dict: Dict = self
            .entries
            .iter()
            .filter(|(key, raw)| !(key.as_str() == LOG_FILE_KEY && raw.is_empty()))
            .map(|(key, raw)| (key.clone(), Self::typed_value(key, raw)))
            .collect();

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
