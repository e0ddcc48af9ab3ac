use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionTransport, ProviderRequest, RawResponse, RelayFailure};

/// Fake provider that replays a canned outcome and records what it was sent.
pub struct RecordingTransport {
    outcome: Result<RawResponse, RelayFailure>,
    calls: Mutex<Vec<(String, ProviderRequest)>>,
}

impl RecordingTransport {
    pub fn ok(status: u16, body: &str) -> Self {
        Self::with_outcome(Ok(RawResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn failing(failure: RelayFailure) -> Self {
        Self::with_outcome(Err(failure))
    }

    fn with_outcome(outcome: Result<RawResponse, RelayFailure>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.calls.lock().unwrap().last().map(|(_, req)| req.clone())
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(key, _)| key.clone())
    }
}

#[async_trait]
impl CompletionTransport for RecordingTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ProviderRequest,
    ) -> Result<RawResponse, RelayFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        self.outcome.clone()
    }
}
