//! Delivery to the OpsGenie cloud API with escalating per-attempt timeouts.

use super::{
    Attempt, AttemptOutcome, DeliveryError, DeliveryReport, DeliveryStatus, Destination,
    OutboundRequest, Payload, Transport, TransportError,
};
use crate::record::AlertRecord;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Path of the Zabbix integration endpoint, relative to the API base URL.
pub const CLOUD_API_PATH: &str = "/v1/json/zabbix";

/// Attempts made before giving up.
pub const MAX_ATTEMPTS: u32 = 3;

/// Timeout for the given 1-based attempt out of a total budget in seconds.
///
/// The budget is split into twelfths and attempt `n` gets `2n` of them, so a
/// 60 second budget yields 10s, 20s and 30s.
pub fn timeout_for(total_seconds: u64, attempt: u32) -> Duration {
    Duration::from_secs((total_seconds / 12) * 2 * u64::from(attempt))
}

fn classify(result: &Result<StatusCode, TransportError>, attempt: u32) -> AttemptOutcome {
    match result {
        Ok(status) if *status == StatusCode::OK => AttemptOutcome::Success,
        _ if attempt < MAX_ATTEMPTS => AttemptOutcome::RetryableFailure,
        _ => AttemptOutcome::TerminalFailure,
    }
}

/// Posts `record` as JSON to `{base_url}/v1/json/zabbix`.
///
/// Only a `200 OK` counts as delivered. Failures are retried immediately with
/// a longer timeout until [`MAX_ATTEMPTS`] is reached, after which the report
/// is returned with [`DeliveryStatus::GaveUp`].
#[instrument(skip_all, fields(base_url = %base_url, total_timeout = total_timeout))]
pub fn send_to_cloud<T: Transport + ?Sized>(
    transport: &T,
    record: &AlertRecord,
    base_url: &str,
    total_timeout: u64,
) -> Result<DeliveryReport, DeliveryError> {
    let url = format!("{base_url}{CLOUD_API_PATH}");
    let payload = Payload::Json(serde_json::to_value(record)?);
    let mut attempts = Vec::with_capacity(MAX_ATTEMPTS as usize);

    for number in 1..=MAX_ATTEMPTS {
        let timeout = timeout_for(total_timeout, number);
        info!(
            attempt = number,
            "Trying to send data to OpsGenie with timeout: {}s",
            timeout.as_secs()
        );

        let request = OutboundRequest {
            url: url.clone(),
            payload: payload.clone(),
            timeout: Some(timeout),
        };
        let result = transport.send(&request);
        let outcome = classify(&result, number);

        match (&outcome, &result) {
            (AttemptOutcome::Success, _) => {
                info!("Data from Zabbix posted to OpsGenie successfully.");
            }
            (AttemptOutcome::RetryableFailure, Ok(status)) => {
                warn!(attempt = number, status = %status, "Error occurred while sending data, will retry.");
            }
            (AttemptOutcome::RetryableFailure, Err(e)) => {
                warn!(attempt = number, error = %e, "Error occurred while sending data, will retry.");
            }
            (AttemptOutcome::TerminalFailure, Ok(status)) => {
                error!(attempt = number, status = %status, "Failed to post data from Zabbix to OpsGenie.");
            }
            (AttemptOutcome::TerminalFailure, Err(e)) => {
                error!(attempt = number, error = %e, "Failed to post data from Zabbix to OpsGenie.");
            }
        }

        attempts.push(Attempt {
            number,
            timeout: Some(timeout),
            result,
            outcome,
        });

        if outcome == AttemptOutcome::Success {
            return Ok(DeliveryReport {
                destination: Destination::Cloud,
                url,
                attempts,
                status: DeliveryStatus::Delivered,
            });
        }
    }

    Ok(DeliveryReport {
        destination: Destination::Cloud,
        url,
        attempts,
        status: DeliveryStatus::GaveUp,
    })
}
