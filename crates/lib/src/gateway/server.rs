//! Webhook HTTP server (single port): liveness on `/`, LINE webhook on `/webhook`.

use crate::completion::CompletionClient;
use crate::config::{self, CompletionSettings, Config, LineCredentials, ServerConfig};
use crate::dispatch;
use crate::line::{signature, LineClient, ReplySender, SIGNATURE_HEADER};
use crate::responder::{ChatResponder, Responder, WeatherResponder};
use crate::weather::{JmaClient, RegionTable};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Which bot a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Relays messages to the completion API.
    Chat,
    /// Answers region names with today's forecast.
    Weather,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Service::Chat => "chat",
            Service::Weather => "weather",
        }
    }

    /// Plain-text body of `GET /`.
    pub fn liveness(self) -> &'static str {
        match self {
            Service::Chat => "LINE Bot with ChatGPT is running!",
            Service::Weather => "LINE weather bot is running!",
        }
    }
}

/// Shared state for the webhook handlers. Read-only after startup.
#[derive(Clone)]
pub struct WebhookState {
    pub service: Service,
    pub channel_secret: Arc<str>,
    pub responder: Arc<dyn Responder>,
    pub replier: Arc<dyn ReplySender>,
}

impl WebhookState {
    /// Resolve credentials (environment over file) and build the clients for `service`.
    /// Fails when a required secret, token, or key is missing.
    pub fn from_config(config: &Config, service: Service) -> Result<Self> {
        Self::from_config_with(config, service, config::env_lookup)
    }

    /// Like `from_config`, with overrides read through `lookup` instead of the environment.
    pub fn from_config_with<F>(config: &Config, service: Service, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = LineCredentials::resolve_with(config, &lookup)
            .context("resolving LINE channel credentials")?;
        let replier = LineClient::new(&credentials).context("building LINE client")?;
        let responder: Arc<dyn Responder> = match service {
            Service::Chat => {
                let settings = CompletionSettings::resolve_with(config, &lookup)
                    .context("resolving completion settings")?;
                let client =
                    CompletionClient::new(&settings).context("building completion client")?;
                log::info!("chat: model {} at {}", settings.model, settings.base_url);
                Arc::new(ChatResponder::new(client, settings.system_prompt))
            }
            Service::Weather => {
                let source = JmaClient::new(&config.weather).context("building forecast client")?;
                let regions = RegionTable::builtin();
                log::info!(
                    "weather: {} region(s), forecast url {}",
                    regions.len(),
                    config.weather.forecast_url
                );
                Arc::new(WeatherResponder::new(regions, Arc::new(source)))
            }
        };
        Ok(Self {
            service,
            channel_secret: Arc::from(credentials.channel_secret.as_str()),
            responder,
            replier: Arc::new(replier),
        })
    }
}

/// Routes for one service.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Run `service` until SIGINT or SIGTERM.
pub async fn run_service(config: Config, service: Service) -> Result<()> {
    let state = WebhookState::from_config(&config, service)?;
    serve(config.server, state).await
}

/// Bind `server.bind:server.port` and serve an already-built state until shutdown.
pub async fn serve(server: ServerConfig, state: WebhookState) -> Result<()> {
    let service = state.service;
    let app = router(state);

    let bind_addr = format!("{}:{}", server.bind.trim(), server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("{} service listening on {}", service.name(), bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("{} service stopped", service.name());
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns the liveness string.
async fn health_http(State(state): State<WebhookState>) -> &'static str {
    state.service.liveness()
}

/// POST /webhook — verifies `x-line-signature` over the raw body, then answers text
/// messages inline. Anything after a valid signature is acknowledged with 200 so the
/// platform does not redeliver; failures are logged instead.
async fn webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    log::debug!("webhook: signature {:?}", provided);
    log::debug!("webhook: body {}", String::from_utf8_lossy(&body));

    if !signature::verify(&state.channel_secret, &body, provided) {
        log::warn!("webhook: invalid or missing signature, rejecting");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    match dispatch::dispatch(&body, state.responder.as_ref(), state.replier.as_ref()).await {
        Ok(sent) => log::debug!("webhook: {} reply(ies) sent", sent),
        Err(e) => log::warn!("{}: webhook processing failed: {}", state.service.name(), e),
    }
    (StatusCode::OK, "OK")
}
