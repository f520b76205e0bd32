//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.linebot/config.json`) and environment.
//! Secrets are normally supplied through the environment; the file only carries defaults
//! and endpoint overrides. Resolved settings are immutable and handed to each component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_CHANNEL_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_COMPLETION_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_CONFIG_PATH: &str = "LINEBOT_CONFIG_PATH";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API credentials and endpoint.
    #[serde(default)]
    pub line: LineConfig,

    /// Completion API used by the chat service.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Forecast endpoint used by the weather service.
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Listener bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 5000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    5000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret used to verify `x-line-signature`. Overridden by LINE_CHANNEL_SECRET.
    pub channel_secret: Option<String>,
    /// Long-lived channel access token for the reply API. Overridden by LINE_CHANNEL_ACCESS_TOKEN.
    pub channel_access_token: Option<String>,
    /// Messaging API base (default https://api.line.me).
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base: default_line_api_base(),
        }
    }
}

/// Completion API config (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// Overridden by OPENAI_API_KEY.
    pub api_key: Option<String>,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    /// System instruction sent ahead of every user message.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_system_prompt() -> String {
    "あなたは優しくてフレンドリーなLINEボットです。".to_string()
}

fn default_completion_timeout() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_completion_model(),
            base_url: default_completion_base_url(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

/// Forecast endpoint config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConfig {
    /// URL template; `{code}` is replaced by the 6-digit area code.
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_forecast_url() -> String {
    "https://www.jma.go.jp/bosai/forecast/data/forecast/{code}.json".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required setting {0} is not configured")]
    Missing(&'static str),
    #[error("reading config from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Channel secret and access token, both required by every service.
#[derive(Debug, Clone)]
pub struct LineCredentials {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub api_base: String,
}

impl LineCredentials {
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve_with(config, env_lookup)
    }

    pub fn resolve_with<F>(config: &Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel_secret = resolve_value(
            &lookup,
            ENV_CHANNEL_SECRET,
            config.line.channel_secret.as_deref(),
        )
        .ok_or(ConfigError::Missing(ENV_CHANNEL_SECRET))?;
        let channel_access_token = resolve_value(
            &lookup,
            ENV_CHANNEL_ACCESS_TOKEN,
            config.line.channel_access_token.as_deref(),
        )
        .ok_or(ConfigError::Missing(ENV_CHANNEL_ACCESS_TOKEN))?;
        Ok(Self {
            channel_secret,
            channel_access_token,
            api_base: config.line.api_base.trim_end_matches('/').to_string(),
        })
    }
}

/// Completion settings for the chat service; the API key is required.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

impl CompletionSettings {
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve_with(config, env_lookup)
    }

    pub fn resolve_with<F>(config: &Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let c = &config.completion;
        let api_key = resolve_value(&lookup, ENV_COMPLETION_API_KEY, c.api_key.as_deref())
            .ok_or(ConfigError::Missing(ENV_COMPLETION_API_KEY))?;
        Ok(Self {
            api_key,
            model: c.model.clone(),
            base_url: c.base_url.trim_end_matches('/').to_string(),
            system_prompt: c.system_prompt.clone(),
            timeout_secs: c.timeout_secs,
        })
    }
}

/// Env wins over config; blank values count as unset on both sides.
fn resolve_value<F>(lookup: &F, env_key: &str, configured: Option<&str>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env_key)
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Process environment lookup used by `resolve`.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH).map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".linebot").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, LINEBOT_CONFIG_PATH, or the default. Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&s).map_err(|source| ConfigError::Parse { path, source })
}
