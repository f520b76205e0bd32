//! LINE Messaging API plumbing.
//!
//! Webhook signature verification, the inbound event model, and the reply client
//! used to answer an event through its one-time reply token.

mod client;
mod event;
pub mod signature;

pub use client::{split_reply_text, LineClient, LineError, ReplySender};
pub use event::{Event, InboundEvent, MessageContent, WebhookPayload};
pub use signature::SIGNATURE_HEADER;
