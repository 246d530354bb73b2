//! Command orchestration
//!
//! One method per user-invocable operation. Each invocation is a single
//! linear pipeline with early exits on failure, and every failure is
//! rendered into a reply here: nothing escapes into the platform event
//! layer.

use tracing::{debug, error, warn};

use alert_api_common::{render_conditions, ApiError, RuleFields};

use crate::client::AlertApiClient;
use crate::gateway::{ChannelId, ChatGateway};
use crate::webhooks::{
    resolve_delivery_webhook, reverse_resolve_channel, webhook_id_from_url, ResolveError,
};

/// Platform autocomplete surfaces cap out at 25 entries.
const MAX_SUGGESTIONS: usize = 25;

/// A rendered command outcome.
///
/// The gateway delivers it as the follow-up to an already-deferred
/// interaction; deferral itself is the gateway's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Posted to the channel the command was invoked in.
    Channel(String),
    /// Shown only to the caller.
    Ephemeral(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Channel(text) | Reply::Ephemeral(text) => text,
        }
    }
}

/// Handlers for the alert rule commands.
pub struct AlertCommands<G> {
    gateway: G,
    api: AlertApiClient,
}

impl<G: ChatGateway> AlertCommands<G> {
    pub fn new(gateway: G, api: AlertApiClient) -> Self {
        Self { gateway, api }
    }

    /// Register a new alert rule delivering to `channel`.
    ///
    /// Endpoint resolution runs first; when it fails no rule is created, so a
    /// rule never exists without its delivery webhook.
    pub async fn add(&self, guild_id: &str, channel: ChannelId, fields: &RuleFields) -> Reply {
        let webhook = match resolve_delivery_webhook(&self.gateway, channel).await {
            Ok(webhook) => webhook,
            Err(ResolveError::NoPermission) => {
                warn!("webhook resolution denied for channel {}", channel);
                return Reply::Channel(format!(
                    "❌ Could not manage webhooks for {}. Check that the bot has the Manage Webhooks permission.",
                    channel.mention()
                ));
            }
            Err(ResolveError::Platform(detail)) => {
                error!("webhook resolution failed for channel {}: {}", channel, detail);
                return Reply::Channel(format!(
                    "❌ Could not prepare a delivery webhook for {}. Please try again.",
                    channel.mention()
                ));
            }
        };

        let conditions = fields.to_conditions();
        match self.api.create_alert(guild_id, &webhook.url, &conditions).await {
            Ok(rule) => Reply::Channel(format!(
                "✅ Alert rule registered (alert ID: `{}`)\n- Delivery channel: {}",
                rule.alert_id,
                channel.mention()
            )),
            Err(err) => render_api_failure("register the alert rule", &err),
        }
    }

    /// List the rules registered for the space.
    ///
    /// Rendering is per-item tolerant: an undecodable condition string falls
    /// back to the raw text, and a webhook that no longer resolves falls back
    /// to its bare identifier. Neither aborts the listing.
    pub async fn list(&self, guild_id: &str) -> Reply {
        let rules = match self.api.list_alerts(guild_id).await {
            Ok(rules) => rules,
            Err(err) => return render_api_failure("fetch the alert rules", &err),
        };

        if rules.is_empty() {
            return Reply::Channel("No alert rules are registered for this space.".to_string());
        }

        let mut sections = Vec::with_capacity(rules.len());
        for rule in &rules {
            let conditions = match rule.conditions() {
                Ok(decoded) => render_conditions(&decoded),
                Err(err) => {
                    warn!("alert {} has undecodable conditions: {}", rule.alert_id, err);
                    rule.conditions_json.clone()
                }
            };

            let delivery = match reverse_resolve_channel(&self.gateway, &rule.webhook_url).await {
                Some(channel) => format!("Delivery channel: {}", channel.mention()),
                None => match webhook_id_from_url(&rule.webhook_url) {
                    Some(webhook_id) => format!("Webhook ID: `{}`", webhook_id),
                    None => "Webhook ID: unknown".to_string(),
                },
            };

            sections.push(format!(
                "**Alert ID: `{}`**\n{}\nConditions:\n{}",
                rule.alert_id, delivery, conditions
            ));
        }

        Reply::Channel(format!("**Registered alert rules**\n\n{}", sections.join("\n\n")))
    }

    /// Remove a rule by identifier.
    ///
    /// Requires space-management privilege, checked locally: an unauthorized
    /// caller is rejected ephemerally and the service is never contacted.
    pub async fn remove(&self, alert_id: i64, caller_can_manage_space: bool) -> Reply {
        if !caller_can_manage_space {
            return Reply::Ephemeral(
                "❌ You need the Manage Server permission to remove alert rules.".to_string(),
            );
        }

        match self.api.remove_alert(alert_id).await {
            Ok(()) => Reply::Channel(format!("✅ Removed alert rule `{}`.", alert_id)),
            Err(err) if err.is_not_found() => {
                Reply::Channel(format!("❌ No alert rule with ID `{}` exists.", alert_id))
            }
            Err(err) => render_api_failure("remove the alert rule", &err),
        }
    }

    /// Suggest rule identifiers whose decimal form starts with the partial
    /// input. Best-effort: any failure yields an empty set, never an error
    /// surfaced to the input UI.
    pub async fn suggest(&self, guild_id: &str, partial: &str) -> Vec<i64> {
        let rules = match self.api.list_alerts(guild_id).await {
            Ok(rules) => rules,
            Err(err) => {
                debug!("suggestions unavailable for guild {}: {}", guild_id, err);
                return Vec::new();
            }
        };

        rules
            .iter()
            .map(|rule| rule.alert_id)
            .filter(|alert_id| alert_id.to_string().starts_with(partial))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

fn render_api_failure(action: &str, err: &ApiError) -> Reply {
    match err {
        ApiError::Rejected { status, detail } => {
            error!("alert service rejected request to {} ({}): {}", action, status, detail);
            Reply::Channel(format!("❌ Failed to {} (service error {}).", action, status))
        }
        ApiError::Transport(detail) => {
            error!("could not reach the alert service to {}: {}", action, detail);
            Reply::Channel(format!("❌ Failed to {}: the alert service is unreachable.", action))
        }
        ApiError::Unexpected(detail) => {
            error!("unexpected failure while trying to {}: {}", action, detail);
            Reply::Channel("❌ An unexpected error occurred.".to_string())
        }
    }
}
