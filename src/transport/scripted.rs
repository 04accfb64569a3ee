//! Scripted transport for tests: replays queued responses and records requests.

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

pub(crate) enum Scripted {
    Respond(HttpResponse),
    Fail(TransportError),
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with a JSON body.
    pub(crate) fn ok(self, body: Value) -> Self {
        self.respond(200, body.to_string())
    }

    pub(crate) fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .push_back(Scripted::Respond(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(self, error: TransportError) -> Self {
        self.script.lock().push_back(Scripted::Fail(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// JSON body of the n-th recorded request.
    pub(crate) fn body(&self, index: usize) -> Value {
        let sent = self.sent.lock();
        let body = sent[index].body.as_deref().unwrap_or("null");
        serde_json::from_str(body).unwrap()
    }

    pub(crate) fn url(&self, index: usize) -> String {
        self.sent.lock()[index].url.to_string()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.lock().push(request.clone());
        match self.script.lock().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            None => panic!("unexpected request to {}", request.url),
        }
    }
}

/// A transport error with a recognisable message, for cause assertions.
pub(crate) fn network_error(message: &str) -> TransportError {
    TransportError::Client(format!("network error: {}", message))
}
