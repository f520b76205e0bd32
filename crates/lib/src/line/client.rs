//! Reply sender: answers an event through the Messaging API reply endpoint.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::LineCredentials;

/// Per-message text limit of the reply API (characters).
const MAX_TEXT_CHARS: usize = 5000;
/// Messages accepted by a single reply call.
const MAX_MESSAGES_PER_REPLY: usize = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// Sends reply text for a one-time reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), LineError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    typ: &'static str,
    text: String,
}

/// Client for the LINE Messaging API (https://api.line.me by default).
#[derive(Clone)]
pub struct LineClient {
    api_base: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(credentials: &LineCredentials) -> Result<Self, LineError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_base: credentials.api_base.trim_end_matches('/').to_string(),
            access_token: credentials.channel_access_token.clone(),
            client,
        })
    }

    /// POST /v2/bot/message/reply
    pub async fn reply(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let messages = split_reply_text(text, MAX_TEXT_CHARS)
            .into_iter()
            .map(|text| TextMessage { typ: "text", text })
            .collect();
        let body = ReplyRequest {
            reply_token,
            messages,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("reply failed: {} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        self.reply(reply_token, text).await
    }
}

/// Split reply text into at most five chunks of `max_chars` characters, breaking at a
/// newline or space in the second half of each window when one is available. Text past
/// the fifth chunk is dropped.
pub fn split_reply_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if chunks.len() == MAX_MESSAGES_PER_REPLY {
            log::warn!(
                "reply text exceeds {} messages, dropping {} trailing characters",
                MAX_MESSAGES_PER_REPLY,
                rest.chars().count()
            );
            break;
        }
        // Byte offsets just past `max_chars` and `max_chars / 2` characters.
        let byte_at = |n: usize| {
            rest.char_indices()
                .nth(n)
                .map(|(i, _)| i)
                .unwrap_or(rest.len())
        };
        let end = byte_at(max_chars);
        let cut = if end < rest.len() {
            // Whitespace in the first half of the window would leave a stub chunk.
            let half = byte_at(max_chars / 2);
            let after = |c: char| {
                rest[..end]
                    .rfind(c)
                    .map(|pos| pos + 1)
                    .filter(|&cut| cut > half)
            };
            after('\n').or_else(|| after(' ')).unwrap_or(end)
        } else {
            end
        };
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_message() {
        assert_eq!(split_reply_text("こんにちは", 5000), vec!["こんにちは"]);
    }

    #[test]
    fn splits_on_character_count_not_bytes() {
        let text = "晴".repeat(7);
        let chunks = split_reply_text(&text, 3);
        assert_eq!(chunks, vec!["晴晴晴", "晴晴晴", "晴"]);
    }

    #[test]
    fn prefers_whitespace_boundaries() {
        let chunks = split_reply_text("aaa bbb\nccc", 6);
        assert_eq!(chunks, vec!["aaa ", "bbb\n", "ccc"]);
    }

    #[test]
    fn early_whitespace_does_not_shorten_chunk() {
        let text = format!("a {}", "x".repeat(20));
        assert_eq!(
            split_reply_text(&text, 10),
            vec!["a xxxxxxxx", "xxxxxxxxxx", "xx"]
        );
    }

    #[test]
    fn late_newline_wins_over_early_one() {
        let text = format!("a\n{}\n{}", "b".repeat(6), "c".repeat(4));
        assert_eq!(
            split_reply_text(&text, 10),
            vec![format!("a\n{}\n", "b".repeat(6)), "c".repeat(4)]
        );
    }

    #[test]
    fn caps_at_five_messages() {
        let text = "x".repeat(100);
        let chunks = split_reply_text(&text, 10);
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() == 10));
    }

    #[test]
    fn reply_body_shape() {
        let body = ReplyRequest {
            reply_token: "tok",
            messages: vec![TextMessage {
                typ: "text",
                text: "hi".to_string(),
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"replyToken": "tok", "messages": [{"type": "text", "text": "hi"}]})
        );
    }
}
