//! Responders: turn the text of one message into reply text.
//!
//! The chat service relays to the completion API; the weather service resolves a
//! region and reports today's forecast.

use async_trait::async_trait;
use std::sync::Arc;

use crate::completion::{CompletionClient, CompletionError};
use crate::weather::{self, ForecastSource, RegionTable};

#[derive(Debug, thiserror::Error)]
pub enum RespondError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Computes the reply for one text message.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Short name for logs (e.g. "chat", "weather").
    fn name(&self) -> &str;
    async fn respond(&self, text: &str) -> Result<String, RespondError>;
}

/// Relays user text to the completion API under a fixed system instruction.
pub struct ChatResponder {
    client: CompletionClient,
    system_prompt: String,
}

impl ChatResponder {
    pub fn new(client: CompletionClient, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl Responder for ChatResponder {
    fn name(&self) -> &str {
        "chat"
    }

    async fn respond(&self, text: &str) -> Result<String, RespondError> {
        log::info!("chat: asking {} ({} chars)", self.client.model(), text.chars().count());
        Ok(self.client.complete(&self.system_prompt, text).await?)
    }
}

/// Looks up today's forecast for a region named in the message. Never fails:
/// fetch and decode errors become the reply text.
pub struct WeatherResponder {
    regions: RegionTable,
    source: Arc<dyn ForecastSource>,
}

impl WeatherResponder {
    pub fn new(regions: RegionTable, source: Arc<dyn ForecastSource>) -> Self {
        Self { regions, source }
    }

    pub async fn reply_for(&self, text: &str) -> String {
        let Some(region) = weather::resolve_region(&self.regions, text) else {
            log::debug!("weather: no region matched {:?}", text.trim());
            return weather::region_prompt(&self.regions);
        };
        match self.source.today(&region.area_code).await {
            Ok(forecast) => weather::format_forecast(&forecast),
            Err(e) => {
                log::warn!("weather: forecast for {} ({}) failed: {}", region.name, region.area_code, e);
                weather::format_failure(&e)
            }
        }
    }
}

#[async_trait]
impl Responder for WeatherResponder {
    fn name(&self) -> &str {
        "weather"
    }

    async fn respond(&self, text: &str) -> Result<String, RespondError> {
        Ok(self.reply_for(text).await)
    }
}
