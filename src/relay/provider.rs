use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;

use super::RelayFailure;
use crate::web::models::Message;

/// Wire payload for the OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// Status and body text of one provider exchange, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP round trip to the completion provider. Implementations make
/// exactly one attempt and never retry.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(
        &self,
        api_key: &str,
        request: &ProviderRequest,
    ) -> Result<RawResponse, RelayFailure>;
}

pub struct OpenRouterTransport {
    client: Client,
    url: String,
    referer: String,
}

impl OpenRouterTransport {
    pub fn new(
        url: impl Into<String>,
        referer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            referer: referer.into(),
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ProviderRequest,
    ) -> Result<RawResponse, RelayFailure> {
        debug!("POST {} ({} messages)", self.url, request.messages.len());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .header("HTTP-Referer", self.referer.as_str())
            .json(request)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_error)?;

        Ok(RawResponse { status, body })
    }
}

// Builder problems (e.g. a credential that isn't a valid header value) are
// not network trouble.
fn classify_error(e: reqwest::Error) -> RelayFailure {
    if e.is_builder() {
        RelayFailure::Unexpected(e.to_string())
    } else if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
    {
        RelayFailure::Transport(e.to_string())
    } else {
        RelayFailure::Unexpected(e.to_string())
    }
}
