//! Chat-command front end for the alert rule service
//!
//! Operators of a community space register, list, and remove alert rules:
//! filter conditions that the remote alert service matches against future
//! posts, delivering hits to a channel through a webhook. This crate owns the
//! bot side of that lifecycle:
//!
//! - [`client::AlertApiClient`]: stateless REST client for rule CRUD
//! - [`webhooks`]: find-or-create resolution of the delivery webhook
//! - [`commands::AlertCommands`]: command orchestration and rendering
//! - [`gateway::ChatGateway`]: the interface the hosting chat gateway
//!   implements; session and event plumbing live outside this crate
//!
//! The host wires these together after loading [`config::BotConfig`], which
//! fails fast when the platform token or service base URL is missing.

use anyhow::Context;

pub mod client;
pub mod commands;
pub mod config;
pub mod gateway;
pub mod webhooks;

pub use client::AlertApiClient;
pub use commands::{AlertCommands, Reply};
pub use config::BotConfig;

/// Initialize process-wide logging with an environment filter.
///
/// Hosts call this once at startup, before loading configuration.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alert_bot=info".parse().context("invalid default log directive")?),
        )
        .init();
    Ok(())
}
