//! zabbix2opsgenie - Zabbix to OpsGenie alert forwarder
//!
//! Invoked by a Zabbix action once per alert. Reads the integration
//! configuration, builds the alert record from the command-line attributes
//! and delivers it, then exits.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info, warn};
use zabbix2opsgenie::{
    cli::{Cli, VERSION},
    config::Config,
    delivery::{DeliveryError, Forwarder, ReqwestTransport},
    logging, AlertRecord,
};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if cli.version_requested() {
        println!("Version: {VERSION}");
        return ExitCode::SUCCESS;
    }

    let config_path = cli.config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration from {}: {}", config_path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    // The guard must outlive every log call below so buffered lines are flushed.
    let _log_guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to initialise logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DeliveryError>() {
                Some(cause) if cause.is_configuration_error() => {
                    error!(error = %cause, "Invalid delivery configuration")
                }
                _ => error!("{:#}", err),
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    config.log_debug();

    let record = AlertRecord::assemble(&config.api_key, cli.alert_record());
    let report = Forwarder::new(config, ReqwestTransport::new())
        .deliver(&record)
        .context("Delivery aborted")?;

    // Giving up on the cloud API is logged but still a normal exit.
    if report.is_delivered() {
        info!(
            destination = %report.destination,
            attempts = report.attempts.len(),
            "Alert delivered"
        );
    } else {
        warn!(
            destination = %report.destination,
            attempts = report.attempts.len(),
            "Alert was not delivered"
        );
    }
    Ok(())
}
