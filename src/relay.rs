use log::{error, info, warn};
use serde::Deserialize;

use crate::error::RelayError;
use crate::upstream::{CompletionChoice, UpstreamClient, UpstreamPayload, UpstreamReply};
use crate::web::models::{ChatRequest, ChatResponse};

// Validate, forward upstream exactly once, normalize the reply.
// Validation failures never touch the network.
pub async fn handle(
    upstream: &UpstreamClient,
    request: ChatRequest,
) -> Result<ChatResponse, RelayError> {
    if let Err(err) = request.check() {
        warn!("Rejected chat request: {}", err);
        return Err(err);
    }

    let payload = UpstreamPayload::from(request);
    info!(
        "Forwarding {} message(s) to upstream (model: {}, max_tokens: {})",
        payload.messages.len(),
        payload.model,
        payload.max_tokens
    );

    match upstream.complete(&payload).await.and_then(normalize) {
        Ok(response) => {
            info!("Response length: {} characters", response.response.chars().count());
            Ok(response)
        }
        Err(e) => {
            error!("Upstream error: {}", e);
            Err(e)
        }
    }
}

// Maps a decoded upstream reply to the outbound shape
pub fn normalize(reply: UpstreamReply) -> Result<ChatResponse, RelayError> {
    let first = reply
        .choices
        .first()
        .ok_or_else(|| RelayError::Upstream("upstream reply contains no choices".to_string()))?;
    let choice = CompletionChoice::deserialize(first)?;

    Ok(ChatResponse {
        response: choice.message.content,
        choices: reply.choices,
        usage: reply.usage,
        model: reply.model,
        created: reply.created,
    })
}
