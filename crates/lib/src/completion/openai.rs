//! Chat completions client (https://api.openai.com/v1 by default).
//! One system instruction plus one user turn per call; no history is kept.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CompletionSettings;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion api returned no answer text")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Assistant message; `content` is null when the model only refused or called tools.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for a chat completions endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(settings: &CompletionSettings) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST /chat/completions — returns the first choice's content.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: build_messages(system_prompt, user_text),
        };
        log::debug!("completion: POST {} (model {})", url, self.model);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        first_choice(data)
    }
}

fn build_messages(system_prompt: &str, user_text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(user_text)]
}

/// Content of the first choice. A missing choice or null/blank content is `Empty`,
/// since the reply API rejects empty text messages.
fn first_choice(data: ChatResponse) -> Result<String, CompletionError> {
    data.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(CompletionError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_system_then_user() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: build_messages("be kind", "こんにちは"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "be kind"},
                    {"role": "user", "content": "こんにちは"}
                ]
            })
        );
    }

    #[test]
    fn takes_first_choice() {
        let data: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[
                {"index":0,"message":{"role":"assistant","content":"first"},"finish_reason":"stop"},
                {"index":1,"message":{"role":"assistant","content":"second"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(data).unwrap(), "first");
    }

    #[test]
    fn no_choices_is_an_error() {
        let data: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice(data), Err(CompletionError::Empty)));
    }

    #[test]
    fn null_content_is_an_error() {
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(matches!(first_choice(data), Err(CompletionError::Empty)));
    }

    #[test]
    fn blank_content_is_an_error() {
        for content in ["", "  \n\t "] {
            let data = ChatResponse {
                choices: vec![Choice {
                    message: ResponseMessage {
                        content: Some(content.to_string()),
                    },
                }],
            };
            assert!(matches!(first_choice(data), Err(CompletionError::Empty)), "{:?}", content);
        }
    }

    #[test]
    fn surrounding_whitespace_is_kept() {
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":" hi\n"}}]}"#).unwrap();
        assert_eq!(first_choice(data).unwrap(), " hi\n");
    }
}
