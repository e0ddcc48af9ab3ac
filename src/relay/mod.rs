pub mod provider;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::web::models::{Message, Role};
pub use provider::{CompletionTransport, OpenRouterTransport, ProviderRequest, RawResponse};

/// Persona instructions prepended to every conversation before dispatch.
pub const SYSTEM_DIRECTIVE: &str = "You are a warm, emotionally intelligent assistant \
that helps users make personal and career decisions. Your goal is to truly understand their \
feelings, values, and priorities through thoughtful conversation. Start by clarifying what \
they want. Ask only ONE follow-up question at a time. Reflect back what they share to show \
understanding. Avoid sounding generic. Help them weigh trade-offs, summarize options, and \
move toward clarity without forcing a decision. Use a calm, human tone, and never rush the \
user.";

pub const WARN_MISSING_KEY: &str = "Missing API key";
pub const WARN_NETWORK: &str = "Network issue";
pub const WARN_REJECTED: &str = "AI couldn't respond right now";
pub const WARN_INVALID_ANSWER: &str = "AI did not return a valid answer";
pub const WARN_UNEXPECTED: &str = "Unexpected error occurred";

/// Every way a relay call can fail. None of these reach the caller; each one
/// collapses into its fixed warning string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayFailure {
    #[error("no provider API key configured")]
    MissingCredential,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl RelayFailure {
    pub fn warning(&self) -> &'static str {
        match self {
            RelayFailure::MissingCredential => WARN_MISSING_KEY,
            RelayFailure::Transport(_) => WARN_NETWORK,
            RelayFailure::Rejected { .. } => WARN_REJECTED,
            RelayFailure::Malformed(_) => WARN_INVALID_ANSWER,
            RelayFailure::Unexpected(_) => WARN_UNEXPECTED,
        }
    }
}

/// Forwards a transcript to the completion provider and hands back either the
/// model's reply or a warning string.
#[derive(Clone)]
pub struct AdviceRelay {
    api_key: Option<String>,
    model: String,
    transport: Arc<dyn CompletionTransport>,
}

impl AdviceRelay {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            transport,
        }
    }

    /// Never fails: provider errors are logged and replaced by a warning.
    pub async fn get_advice(&self, messages: &[Message]) -> String {
        match self.try_advice(messages).await {
            Ok(answer) => {
                info!("Provider answered with {} characters", answer.len());
                answer
            }
            Err(failure) => {
                match &failure {
                    RelayFailure::MissingCredential => {
                        warn!("OPENROUTER_API_KEY is not set, skipping provider call")
                    }
                    RelayFailure::Transport(e) => error!("Network error: {}", e),
                    RelayFailure::Rejected { status, body } => {
                        error!("Provider error {}: {}", status, body)
                    }
                    RelayFailure::Malformed(e) => {
                        warn!("Provider returned no usable answer: {}", e)
                    }
                    RelayFailure::Unexpected(e) => error!("Unexpected relay error: {}", e),
                }
                failure.warning().to_string()
            }
        }
    }

    pub async fn try_advice(&self, messages: &[Message]) -> Result<String, RelayFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RelayFailure::MissingCredential)?;

        let request = self.build_request(messages);
        info!(
            "Dispatching {} messages to model {}",
            request.messages.len(),
            request.model
        );

        let raw = self.transport.send(api_key, &request).await?;
        if raw.status != 200 {
            return Err(RelayFailure::Rejected {
                status: raw.status,
                body: raw.body,
            });
        }

        debug!("Provider response: {}", raw.body);
        extract_answer(&raw.body)
    }

    /// The directive always goes first; caller-supplied system messages are
    /// passed through untouched after it.
    pub fn build_request(&self, messages: &[Message]) -> ProviderRequest {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(Message::new(Role::System, SYSTEM_DIRECTIVE));
        conversation.extend_from_slice(messages);

        ProviderRequest {
            model: self.model.clone(),
            messages: conversation,
        }
    }
}

fn extract_answer(body: &str) -> Result<String, RelayFailure> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| RelayFailure::Unexpected(format!("response body is not JSON: {}", e)))?;

    let first = json
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .ok_or_else(|| RelayFailure::Malformed("response has no choices".to_string()))?;

    let content = first
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| RelayFailure::Malformed("first choice has no message content".to_string()))?;

    if content.trim().is_empty() {
        return Err(RelayFailure::Malformed("first choice content is empty".to_string()));
    }

    Ok(content.to_string())
}
