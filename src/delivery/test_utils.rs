use crate::delivery::{OutboundRequest, Transport, TransportError};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Fake transport that replays a scripted sequence of responses
pub struct ScriptedTransport {
    // The front of the queue is the next response.
    responses: Arc<Mutex<VecDeque<Result<StatusCode, TransportError>>>>,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response with the given HTTP status
    pub fn push_status(&self, status: u16) {
        let status = StatusCode::from_u16(status).expect("valid HTTP status code");
        self.responses.lock().unwrap().push_back(Ok(status));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &OutboundRequest) -> Result<StatusCode, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connect(format!(
                    "No more responses configured for {}",
                    request.url
                )))
            })
    }
}
