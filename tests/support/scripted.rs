//! In-memory transports for call-count and stall scenarios.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use locshare_core::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays canned responses in order and records every request.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::client("no scripted response left"))
    }
}

/// Never answers; every request stays pending forever.
#[allow(dead_code)]
pub struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        std::future::pending().await
    }
}
