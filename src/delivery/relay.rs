//! Hand-off to a locally hosted Marid relay.

use super::{
    Attempt, AttemptOutcome, DeliveryError, DeliveryReport, DeliveryStatus, Destination,
    OutboundRequest, Payload, Transport,
};
use crate::config::Config;
use crate::record::AlertRecord;
use tracing::{error, info, instrument};

/// Script on the relay that forwards Zabbix alerts to OpsGenie.
pub const RELAY_SCRIPT_PATH: &str = "/script/marid2opsgenie.groovy";

/// Builds the relay script URL from whichever listener is enabled, preferring
/// plain HTTP.
pub fn relay_url(config: &Config) -> Result<String, DeliveryError> {
    let (scheme, host, port) = if config.http_enabled {
        ("http", &config.http_host, &config.http_port)
    } else if config.https_enabled {
        ("https", &config.https_host, &config.https_port)
    } else {
        return Err(DeliveryError::RelayNotEnabled);
    };
    Ok(format!("{scheme}://{host}:{port}{RELAY_SCRIPT_PATH}"))
}

/// The form fields sent to the relay: the record plus `async=true`.
pub fn relay_form(record: &AlertRecord) -> Vec<(String, String)> {
    record
        .fields()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .chain(std::iter::once(("async".to_string(), "true".to_string())))
        .collect()
}

/// Sends `record` to the relay configured in `config`.
pub fn send_to_relay<T: Transport + ?Sized>(
    transport: &T,
    record: &AlertRecord,
    config: &Config,
) -> Result<DeliveryReport, DeliveryError> {
    let url = relay_url(config)?;
    post_to_relay(transport, record, &url)
}

/// Posts `record` to the relay script at `url` exactly once.
///
/// The response status is logged but not checked.
// TODO: treat non-2xx relay responses as failures once Marid's script
// reliably returns an error status.
#[instrument(skip_all, fields(url = %url))]
pub(crate) fn post_to_relay<T: Transport + ?Sized>(
    transport: &T,
    record: &AlertRecord,
    url: &str,
) -> Result<DeliveryReport, DeliveryError> {
    let request = OutboundRequest {
        url: url.to_string(),
        payload: Payload::Form(relay_form(record)),
        timeout: None,
    };

    match transport.send(&request) {
        Ok(status) => {
            info!(status = %status, "Successfully sent data to Marid");
            Ok(DeliveryReport {
                destination: Destination::Relay,
                url: request.url,
                attempts: vec![Attempt {
                    number: 1,
                    timeout: None,
                    result: Ok(status),
                    outcome: AttemptOutcome::Success,
                }],
                status: DeliveryStatus::Delivered,
            })
        }
        Err(source) => {
            error!(error = %source, "Error occurred while sending data to Marid");
            Err(DeliveryError::RelayTransport {
                url: request.url,
                source,
            })
        }
    }
}
