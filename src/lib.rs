//! zabbix2opsgenie - forwards Zabbix alerts to OpsGenie
//!
//! This library assembles the alert record from the attributes Zabbix passes
//! on the command line and delivers it either to the OpsGenie cloud API or to
//! a locally hosted Marid relay.

pub mod cli;
pub mod config;
pub mod delivery;
pub mod logging;
pub mod record;

pub use config::{Config, ConfigError};
pub use delivery::{DeliveryError, DeliveryReport, DeliveryStatus, Forwarder};
pub use record::AlertRecord;
