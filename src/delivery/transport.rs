//! The HTTP seam used by the delivery engine.
//!
//! Every call to [`Transport::send`] is independent: the reqwest-backed
//! implementation builds a new client for each request, so no connection is
//! reused between attempts and each attempt gets exactly the timeout it asks
//! for.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// The body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// A single POST to be performed by a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub payload: Payload,
    /// Connect and read timeout. `None` leaves the transport defaults alone.
    pub timeout: Option<Duration>,
}

/// Why a request did not produce an HTTP response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Performs outbound POST requests.
pub trait Transport {
    /// Sends `request` and returns the response status once the body has
    /// been fully consumed.
    fn send(&self, request: &OutboundRequest) -> Result<StatusCode, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &OutboundRequest) -> Result<StatusCode, TransportError> {
        (**self).send(request)
    }
}

/// Blocking reqwest transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }

    /// Creates the client for one request.
    fn client_for(timeout: Option<Duration>) -> Result<reqwest::blocking::Client, TransportError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout).timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &OutboundRequest) -> Result<StatusCode, TransportError> {
        let client = Self::client_for(request.timeout)?;
        let builder = client.post(&request.url);
        let builder = match &request.payload {
            Payload::Json(body) => builder.json(body),
            Payload::Form(fields) => builder.form(fields),
        };

        let mut response = builder.send()?;
        let status = response.status();
        // Drain the body so the connection is released before the next attempt.
        if let Err(err) = response.copy_to(&mut std::io::sink()) {
            tracing::debug!(error = %err, "Failed to drain response body");
        }
        Ok(status)
    }
}
