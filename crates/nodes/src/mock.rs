//! `MockTransport` — a test double for `HttpTransport`.
//!
//! Useful in unit and integration tests where hitting the real API is
//! either impossible or irrelevant.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{HttpRequest, HttpTransport, TransportError};

/// Behaviour injected into `MockTransport` at construction time.
pub enum MockBehaviour {
    /// Every call returns this body.
    ReturnValue(Value),
    /// Every call fails with this error.
    Fail(TransportError),
    /// Calls consume these results in order; once drained every call fails.
    Script(Mutex<VecDeque<Result<Value, TransportError>>>),
}

/// A mock transport that records every request it receives and returns a
/// programmer-specified result.
pub struct MockTransport {
    /// What the transport does when `send` is called.
    pub behaviour: MockBehaviour,
    /// All requests seen (in call order).
    pub calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always succeeds with the given body.
    pub fn returning(value: Value) -> Self {
        Self::with_behaviour(MockBehaviour::ReturnValue(value))
    }

    /// Create a mock that always fails.
    pub fn failing(error: TransportError) -> Self {
        Self::with_behaviour(MockBehaviour::Fail(error))
    }

    /// Create a mock that replays `results`, one per call.
    pub fn scripted(results: impl IntoIterator<Item = Result<Value, TransportError>>) -> Self {
        Self::with_behaviour(MockBehaviour::Script(Mutex::new(results.into_iter().collect())))
    }

    /// Number of requests sent through this transport.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(request);

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::Fail(e) => Err(e.clone()),
            MockBehaviour::Script(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("mock script exhausted".into()))),
        }
    }
}
