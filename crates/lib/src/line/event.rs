//! Webhook payload as delivered by the LINE platform.
//!
//! Only the fields the services read are modelled; everything else is ignored.
//! Unknown event and message types decode to `Unknown` so new platform features
//! never fail a request.

use serde::Deserialize;

/// Body of a webhook POST.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    /// Empty for the console's "verify" ping.
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Message {
        #[serde(rename = "replyToken")]
        reply_token: String,
        message: MessageContent,
    },
    Follow {
        #[serde(rename = "replyToken")]
        reply_token: String,
    },
    Unfollow,
    Postback {
        #[serde(rename = "replyToken")]
        reply_token: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
    #[serde(other)]
    Unknown,
}

/// A text message that should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub reply_token: String,
    pub message_text: String,
}

impl Event {
    /// Text message events only; every other kind is ignored by the dispatcher.
    pub fn as_inbound(&self) -> Option<InboundEvent> {
        match self {
            Event::Message {
                reply_token,
                message: MessageContent::Text { text },
            } => Some(InboundEvent {
                reply_token: reply_token.clone(),
                message_text: text.clone(),
            }),
            Event::Message { .. }
            | Event::Follow { .. }
            | Event::Unfollow
            | Event::Postback { .. }
            | Event::Unknown => None,
        }
    }
}
