//! Delivery of an [`AlertRecord`] to OpsGenie or to the Marid relay.
//!
//! The destination is chosen once per run from the configuration. The cloud
//! API is retried with escalating timeouts; the relay gets a single attempt
//! and any transport failure is reported as an error.

pub mod cloud;
pub mod relay;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod transport;

use crate::config::Config;
use crate::record::AlertRecord;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub use cloud::{send_to_cloud, timeout_for, CLOUD_API_PATH, MAX_ATTEMPTS};
pub use relay::{relay_url, send_to_relay, RELAY_SCRIPT_PATH};
pub use transport::{OutboundRequest, Payload, ReqwestTransport, Transport, TransportError};

/// Errors that stop a delivery run.
///
/// A cloud delivery that exhausts its attempts is not an error; it is
/// reported as [`DeliveryStatus::GaveUp`].
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Marid routing is enabled but neither http.server.enabled nor https.server.enabled is true")]
    RelayNotEnabled,

    #[error("failed to send data to Marid at {url}: {source}")]
    RelayTransport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to encode alert payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DeliveryError {
    /// True when the failure comes from the configuration rather than the network.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::RelayNotEnabled)
    }
}

/// Which receiver a run delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Cloud,
    Relay,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Cloud => write!(f, "OpsGenie"),
            Destination::Relay => write!(f, "Marid"),
        }
    }
}

/// The resolved routing decision for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// POST JSON to `{base_url}/v1/json/zabbix`.
    Cloud { base_url: String },
    /// POST a form to the relay script at `url`.
    Relay { url: String },
}

impl Route {
    /// Decides where the alert goes. Fails when the relay is selected but no
    /// relay listener is enabled.
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        if config.use_relay {
            Ok(Route::Relay {
                url: relay_url(config)?,
            })
        } else {
            Ok(Route::Cloud {
                base_url: config.api_url.clone(),
            })
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            Route::Cloud { .. } => Destination::Cloud,
            Route::Relay { .. } => Destination::Relay,
        }
    }
}

/// Classification of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    TerminalFailure,
}

/// What happened on one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// 1-based attempt number.
    pub number: u32,
    pub timeout: Option<Duration>,
    pub result: Result<StatusCode, TransportError>,
    pub outcome: AttemptOutcome,
}

/// Final state of a delivery that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    GaveUp,
}

/// The record of one delivery run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    pub destination: Destination,
    pub url: String,
    pub attempts: Vec<Attempt>,
    pub status: DeliveryStatus,
}

impl DeliveryReport {
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

/// Routes and sends alert records according to a [`Config`].
pub struct Forwarder<'a, T> {
    config: &'a Config,
    transport: T,
}

impl<'a, T: Transport> Forwarder<'a, T> {
    pub fn new(config: &'a Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// Routes `record` and sends it. Routing errors are returned before any
    /// request is made.
    pub fn deliver(&self, record: &AlertRecord) -> Result<DeliveryReport, DeliveryError> {
        let route = Route::from_config(self.config)?;

        debug!("Data to be posted to {}:", route.destination());
        debug!(?record);

        match route {
            Route::Cloud { base_url } => {
                send_to_cloud(&self.transport, record, &base_url, self.config.timeout)
            }
            Route::Relay { url } => {
                info!("Sending data to Marid");
                relay::post_to_relay(&self.transport, record, &url)
            }
        }
    }
}
