//! In-memory test doubles for the client ports.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use moneybird_core::{AuthorizationNotifier, Transport, TransportOptions};
use moneybird_domain::{Headers, MoneybirdError, RawResponse, Result};
use serde_json::Value;

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<TransportOptions>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    #[must_use]
    pub fn respond(self, status: u16, headers: Headers, body: impl Into<String>) -> Self {
        self.push(Ok(RawResponse { status, headers, body: body.into() }));
        self
    }

    /// Queue a JSON response with an `application/json` content type.
    #[must_use]
    pub fn respond_json(self, status: u16, body: Value) -> Self {
        let headers = Headers::new().with("Content-Type", "application/json; charset=utf-8");
        self.respond(status, headers, body.to_string())
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail(self, error: MoneybirdError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<RawResponse>) {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).push_back(response);
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<TransportOptions> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_request(&self) -> Option<TransportOptions> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// URLs of every executed request.
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().filter_map(|options| options.url).collect()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(options.clone());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(MoneybirdError::Internal("no scripted response left".into())))
    }
}

/// Notifier that records every authorization URL it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    urls: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AuthorizationNotifier for RecordingNotifier {
    fn authorization_required(&self, authorization_url: &str) {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).push(authorization_url.to_string());
    }
}
