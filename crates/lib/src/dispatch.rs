//! Event dispatcher: verified webhook body to replies.
//!
//! Text message events are answered one at a time, in array order. The first
//! failure stops the remaining events of the same request.

use crate::line::{InboundEvent, LineError, ReplySender, WebhookPayload};
use crate::responder::{RespondError, Responder};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("parsing webhook body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("responding to event: {0}")]
    Respond(#[from] RespondError),
    #[error("sending reply: {0}")]
    Reply(#[from] LineError),
}

/// Parse `body` and answer every text message event. Returns the number of replies sent.
pub async fn dispatch(
    body: &[u8],
    responder: &dyn Responder,
    replier: &dyn ReplySender,
) -> Result<usize, DispatchError> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    let inbound: Vec<InboundEvent> = payload.events.iter().filter_map(|e| e.as_inbound()).collect();
    if payload.events.len() > inbound.len() {
        log::debug!(
            "dispatch: ignoring {} non-text event(s)",
            payload.events.len() - inbound.len()
        );
    }
    let mut sent = 0;
    for event in inbound {
        let reply = responder.respond(&event.message_text).await?;
        replier.send_reply(&event.reply_token, &reply).await?;
        log::info!("{}: replied ({} chars)", responder.name(), reply.chars().count());
        sent += 1;
    }
    Ok(sent)
}
