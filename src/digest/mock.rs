//! In-memory transport for tests.
//!
//! Routes map a relative path to a canned body or status; every requested
//! path is recorded so tests can assert which requests were (not) issued.
//! Unrouted paths answer 404.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::error::DigestResult;
use super::transport::{Transport, TransportFuture, TransportResponse};

#[derive(Clone, Debug)]
enum MockRoute {
    Json(Value),
    Raw(String),
    Status(u16),
}

/// Mock transport with deterministic responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: HashMap<String, MockRoute>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with a JSON body.
    #[must_use]
    pub fn with_json(mut self, path: impl Into<String>, body: Value) -> Self {
        self.routes.insert(path.into(), MockRoute::Json(body));
        self
    }

    /// Answer `path` with a raw body that is parsed on request.
    #[must_use]
    pub fn with_raw(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(path.into(), MockRoute::Raw(body.into()));
        self
    }

    /// Answer `path` with a non-success status.
    #[must_use]
    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.routes.insert(path.into(), MockRoute::Status(status));
        self
    }

    /// Paths requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn respond(&self, path: &str) -> DigestResult<TransportResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());

        match self.routes.get(path) {
            Some(MockRoute::Json(body)) => Ok(TransportResponse::Success(body.clone())),
            Some(MockRoute::Raw(body)) => Ok(TransportResponse::Success(serde_json::from_str(body)?)),
            Some(MockRoute::Status(status)) => Ok(TransportResponse::Failure { status: *status }),
            None => Ok(TransportResponse::Failure { status: 404 }),
        }
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str) -> TransportFuture<'_, DigestResult<TransportResponse>> {
        let path = path.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.respond(&path)
        })
    }
}
