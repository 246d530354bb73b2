//! Interface to the chat platform
//!
//! The gateway (connection, session, event dispatch) is owned by the hosting
//! process; this module only fixes the surface the alert commands need from
//! it: webhook management on a channel and the bot's own identity.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a channel inside a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// Render the platform mention form, e.g. `<#123>`.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a platform user (including the bot itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A platform webhook bound to one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: u64,
    pub channel_id: ChannelId,
    /// The user that created the webhook; the platform may omit it.
    pub owner_id: Option<UserId>,
    pub url: String,
}

/// Errors reported by the chat platform.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("missing permission to manage webhooks")]
    Forbidden,

    #[error("webhook not found")]
    NotFound,

    #[error("chat platform error: {0}")]
    Platform(String),
}

/// Operations the alert commands need from the hosting gateway.
///
/// Implementations must be safe to share across concurrently running command
/// invocations; every method takes `&self`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// List the webhooks currently bound to a channel, in the platform's
    /// reported creation order.
    async fn channel_webhooks(&self, channel: ChannelId) -> Result<Vec<Webhook>, GatewayError>;

    /// Create a webhook bound to the channel.
    async fn create_webhook(&self, channel: ChannelId, name: &str) -> Result<Webhook, GatewayError>;

    /// Fetch a webhook by its identifier, wherever it is bound.
    async fn fetch_webhook(&self, webhook_id: u64) -> Result<Webhook, GatewayError>;

    /// The bot's own user identity.
    fn bot_user_id(&self) -> UserId;

    /// The bot's display name, used to name created webhooks.
    fn bot_display_name(&self) -> String;
}
