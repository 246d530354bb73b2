//! Delivery webhook resolution
//!
//! Every alert rule delivers through a webhook the bot owns on the target
//! channel. Resolution is find-or-create so a channel never accumulates more
//! than one bot-owned webhook, and the reverse direction (webhook URL back to
//! a channel, for listings) is strictly best-effort.

use thiserror::Error;
use tracing::{debug, info};

use crate::gateway::{ChannelId, ChatGateway, GatewayError, Webhook};

/// Failure to resolve a delivery webhook for a channel.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("missing permission to manage webhooks in the target channel")]
    NoPermission,

    #[error("chat platform error while resolving the delivery webhook: {0}")]
    Platform(String),
}

impl From<GatewayError> for ResolveError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Forbidden => ResolveError::NoPermission,
            other => ResolveError::Platform(other.to_string()),
        }
    }
}

/// Find the bot-owned webhook on `channel`, creating one when absent.
///
/// The first owned webhook in the platform's listing order wins, so repeated
/// calls return the same endpoint and never create duplicates. Failures are
/// reported, not retried; the caller may rerun the whole command.
pub async fn resolve_delivery_webhook<G>(
    gateway: &G,
    channel: ChannelId,
) -> Result<Webhook, ResolveError>
where
    G: ChatGateway + ?Sized,
{
    let existing = gateway.channel_webhooks(channel).await?;
    let bot_id = gateway.bot_user_id();

    if let Some(webhook) = existing.into_iter().find(|hook| hook.owner_id == Some(bot_id)) {
        debug!("reusing webhook {} for channel {}", webhook.id, channel);
        return Ok(webhook);
    }

    let name = format!("{} Alerts", gateway.bot_display_name());
    let created = gateway.create_webhook(channel, &name).await?;
    info!("created webhook {} for channel {}", created.id, channel);
    Ok(created)
}

/// Extract the webhook identifier from its URL.
///
/// Webhook URLs end in `/{id}/{token}`; the identifier is the second-to-last
/// path segment.
pub fn webhook_id_from_url(url: &str) -> Option<u64> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    segments.next()?;
    segments.next()?.parse().ok()
}

/// Best-effort resolution of a webhook URL back to its channel.
///
/// Returns `None` when the URL is malformed or the platform cannot produce
/// the webhook (deleted externally, no permission); failure on this path is
/// an expected outcome, not an error.
pub async fn reverse_resolve_channel<G>(gateway: &G, webhook_url: &str) -> Option<ChannelId>
where
    G: ChatGateway + ?Sized,
{
    let webhook_id = webhook_id_from_url(webhook_url)?;
    match gateway.fetch_webhook(webhook_id).await {
        Ok(webhook) => Some(webhook.channel_id),
        Err(err) => {
            debug!("could not resolve webhook {} to a channel: {}", webhook_id, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockChatGateway, UserId};

    const BOT: UserId = UserId(9000);

    fn webhook(id: u64, channel: u64, owner: Option<UserId>) -> Webhook {
        Webhook {
            id,
            channel_id: ChannelId(channel),
            owner_id: owner,
            url: format!("https://chat.example/api/webhooks/{}/token-{}", id, id),
        }
    }

    fn gateway_with_identity() -> MockChatGateway {
        let mut gateway = MockChatGateway::new();
        gateway.expect_bot_user_id().return_const(BOT);
        gateway.expect_bot_display_name().return_const("Sentry".to_string());
        gateway
    }

    #[tokio::test]
    async fn reuses_the_first_owned_webhook_and_never_creates_a_second() {
        let mut gateway = gateway_with_identity();
        gateway
            .expect_channel_webhooks()
            .times(2)
            .returning(|_| {
                Ok(vec![
                    webhook(1, 555, Some(UserId(1))),
                    webhook(2, 555, Some(BOT)),
                    webhook(3, 555, Some(BOT)),
                ])
            });
        gateway.expect_create_webhook().times(0);

        let first = resolve_delivery_webhook(&gateway, ChannelId(555)).await.unwrap();
        let second = resolve_delivery_webhook(&gateway, ChannelId(555)).await.unwrap();

        assert_eq!(first.id, 2);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn creates_a_named_webhook_when_none_is_owned() {
        let mut gateway = gateway_with_identity();
        gateway
            .expect_channel_webhooks()
            .returning(|_| Ok(vec![webhook(1, 555, Some(UserId(1)))]));
        gateway
            .expect_create_webhook()
            .times(1)
            .withf(|channel, name| *channel == ChannelId(555) && name == "Sentry Alerts")
            .returning(|channel, _| Ok(webhook(8, channel.0, Some(BOT))));

        let resolved = resolve_delivery_webhook(&gateway, ChannelId(555)).await.unwrap();
        assert_eq!(resolved.id, 8);
    }

    #[tokio::test]
    async fn forbidden_listing_maps_to_no_permission() {
        let mut gateway = gateway_with_identity();
        gateway
            .expect_channel_webhooks()
            .returning(|_| Err(GatewayError::Forbidden));
        gateway.expect_create_webhook().times(0);

        let err = resolve_delivery_webhook(&gateway, ChannelId(555)).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoPermission));
    }

    #[tokio::test]
    async fn platform_errors_surface_as_platform_failures() {
        let mut gateway = gateway_with_identity();
        gateway
            .expect_channel_webhooks()
            .returning(|_| Ok(Vec::new()));
        gateway
            .expect_create_webhook()
            .returning(|_, _| Err(GatewayError::Platform("rate limited".to_string())));

        let err = resolve_delivery_webhook(&gateway, ChannelId(555)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Platform(detail) if detail.contains("rate limited")));
    }

    #[test]
    fn webhook_id_is_the_second_to_last_url_segment() {
        assert_eq!(
            webhook_id_from_url("https://chat.example/api/webhooks/998877/secret-token"),
            Some(998877)
        );
        assert_eq!(webhook_id_from_url("https://chat.example/api/webhooks/998877/token/"), Some(998877));
        assert_eq!(webhook_id_from_url("https://chat.example/not-a-webhook"), None);
        assert_eq!(webhook_id_from_url(""), None);
    }

    #[tokio::test]
    async fn reverse_resolution_returns_the_channel_on_success() {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_fetch_webhook()
            .withf(|id| *id == 998877)
            .returning(|id| Ok(webhook(id, 321, Some(BOT))));

        let channel =
            reverse_resolve_channel(&gateway, "https://chat.example/api/webhooks/998877/t").await;
        assert_eq!(channel, Some(ChannelId(321)));
    }

    #[tokio::test]
    async fn reverse_resolution_swallows_gateway_failures() {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_fetch_webhook()
            .returning(|_| Err(GatewayError::NotFound));

        let channel =
            reverse_resolve_channel(&gateway, "https://chat.example/api/webhooks/998877/t").await;
        assert_eq!(channel, None);
    }

    #[tokio::test]
    async fn reverse_resolution_skips_malformed_urls_without_a_fetch() {
        let mut gateway = MockChatGateway::new();
        gateway.expect_fetch_webhook().times(0);

        assert_eq!(reverse_resolve_channel(&gateway, "nonsense").await, None);
    }
}
