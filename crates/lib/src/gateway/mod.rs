//! Gateway: the HTTP surface of a service.
//!
//! Single port serves the liveness check and the LINE webhook. Each process runs
//! exactly one service (chat or weather).

mod server;

pub use server::{router, run_service, serve, Service, WebhookState};
