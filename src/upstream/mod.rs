use std::time::Duration;
use anyhow::Result;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{info, debug};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::web::models::{ChatMessage, ChatRequest};

pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

// Body sent to the inference server's chat-completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: i64,
    pub stream: bool,
}

impl From<ChatRequest> for UpstreamPayload {
    fn from(req: ChatRequest) -> Self {
        Self {
            model: req.model,
            messages: req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stream: false,
        }
    }
}

// What we need from the inference server's reply; `choices` is mandatory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamReply {
    pub choices: Vec<Value>,
    #[serde(default)]
    pub usage: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub created: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: String,
}

// A wrapper around the upstream chat-completion API
pub struct UpstreamClient {
    url: Url,
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        Self::with_timeout(config, UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(config: &RelayConfig, timeout: Duration) -> Result<Self> {
        info!(
            "Using upstream inference server at: {} (timeout: {:?})",
            config.upstream_url, timeout
        );

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: config.upstream_url.clone(),
            client,
        })
    }

    // Transport failures, timeouts, error statuses and bodies without `choices`
    // all come back as RelayError::Upstream
    pub async fn complete(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, RelayError> {
        debug!("Payload: {:?}", payload);

        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let reply: UpstreamReply = serde_json::from_slice(&body)?;
        debug!("Reply: {:?}", reply);

        Ok(reply)
    }
}
