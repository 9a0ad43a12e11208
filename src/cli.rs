//! Command-Line Interface (CLI) argument parsing.
//!
//! Zabbix action scripts pass every alert attribute as a named flag. The
//! flags keep their camelCase names and may be written with a single dash
//! (`-triggerName=...`) as existing action scripts do, or with the usual
//! double dash.

use crate::config::DEFAULT_CONFIG_PATH;
use crate::record::AlertRecord;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Version string printed by `-v`.
pub const VERSION: &str = "1.0";

/// Forwards a Zabbix alert to OpsGenie, directly or through Marid.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Path to the integration configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version", num_args = 0..=1, default_missing_value = "true")]
    pub version: Option<String>,

    /// OpsGenie API key, overriding the configured one.
    #[arg(long = "apiKey", default_value = "", allow_hyphen_values = true)]
    pub api_key: String,

    #[arg(
        long = "triggerName",
        value_name = "TRIGGER.NAME",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_name: String,

    #[arg(
        long = "triggerId",
        value_name = "TRIGGER.ID",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_id: String,

    #[arg(
        long = "triggerStatus",
        value_name = "TRIGGER.STATUS",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_status: String,

    #[arg(
        long = "triggerSeverity",
        value_name = "TRIGGER.SEVERITY",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_severity: String,

    #[arg(
        long = "triggerDescription",
        value_name = "TRIGGER.DESCRIPTION",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_description: String,

    #[arg(
        long = "triggerUrl",
        value_name = "TRIGGER.URL",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_url: String,

    #[arg(
        long = "triggerValue",
        value_name = "TRIGGER.VALUE",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub trigger_value: String,

    #[arg(
        long = "hostName",
        value_name = "HOSTNAME",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub host_name: String,

    #[arg(
        long = "ipAddress",
        value_name = "IPADDRESS",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub ip_address: String,

    #[arg(long, value_name = "DATE", default_value = "", allow_hyphen_values = true)]
    pub date: String,

    #[arg(long, value_name = "TIME", default_value = "", allow_hyphen_values = true)]
    pub time: String,

    #[arg(
        long = "itemKey",
        value_name = "ITEM.KEY",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub item_key: String,

    #[arg(
        long = "itemValue",
        value_name = "ITEM.VALUE",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub item_value: String,

    #[arg(
        long = "eventId",
        value_name = "EVENT.ID",
        default_value = "",
        allow_hyphen_values = true,
    )]
    pub event_id: String,
}

impl Cli {
    /// Parses the process arguments, accepting single-dash long flags.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// True when `-v` was given with a non-empty value (or none at all).
    pub fn version_requested(&self) -> bool {
        matches!(&self.version, Some(value) if !value.is_empty())
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// The alert attributes as given on the command line. `api_key` holds
    /// the override, empty when none was passed.
    pub fn alert_record(&self) -> AlertRecord {
        AlertRecord {
            api_key: self.api_key.clone(),
            trigger_name: self.trigger_name.clone(),
            trigger_id: self.trigger_id.clone(),
            trigger_status: self.trigger_status.clone(),
            trigger_severity: self.trigger_severity.clone(),
            trigger_description: self.trigger_description.clone(),
            trigger_url: self.trigger_url.clone(),
            trigger_value: self.trigger_value.clone(),
            host_name: self.host_name.clone(),
            ip_address: self.ip_address.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            item_key: self.item_key.clone(),
            item_value: self.item_value.clone(),
            event_id: self.event_id.clone(),
        }
    }
}

/// Rewrites `-name` / `-name=value` into `--name` / `--name=value` for every
/// known long flag. The argument following a value-taking flag written
/// without `=` is its value and is never rewritten. Arguments after a bare
/// `--` are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let long_flags: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .collect();
    // `-v` takes an optional value, so the token after it is not claimed.
    let value_flags: Vec<&str> = command
        .get_arguments()
        .filter(|arg| arg.get_action().takes_values() && arg.get_id() != "version")
        .filter_map(|arg| arg.get_long())
        .collect();

    let mut normalized = Vec::new();
    let mut passthrough = false;
    let mut value_expected = false;
    for (index, arg) in args.into_iter().map(Into::into).enumerate() {
        if index == 0 || passthrough || value_expected {
            value_expected = false;
            normalized.push(arg);
            continue;
        }

        let rewritten = match arg.to_str() {
            Some("--") => {
                passthrough = true;
                None
            }
            Some(text) if text.starts_with('-') => {
                let flag = text.trim_start_matches('-');
                let (name, inline_value) = match flag.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (flag, false),
                };
                if name.len() > 1 && long_flags.contains(&name) {
                    value_expected = !inline_value && value_flags.contains(&name);
                    (!text.starts_with("--")).then(|| format!("-{text}"))
                } else {
                    None
                }
            }
            _ => None,
        };
        normalized.push(rewritten.map(OsString::from).unwrap_or(arg));
    }
    normalized
}
