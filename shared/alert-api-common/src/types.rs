//! Wire types for the alert rule service

use serde::{Deserialize, Serialize};

use crate::conditions::{decode, ConditionSet};

/// A stored alert rule, owned by the remote service.
///
/// The service assigns `alert_id` on creation; the rule is read-only
/// afterwards and removed by hard delete. Everything held here is an
/// ephemeral reference, never an authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub alert_id: i64,
    #[serde(default)]
    pub guild_id: String,
    pub webhook_url: String,
    pub conditions_json: String,
}

impl AlertRule {
    /// Decode the embedded condition string for structured access.
    ///
    /// Conditions travel as an embedded JSON string to keep the wire contract
    /// stable while the field vocabulary evolves, so consumers decode on read.
    pub fn conditions(&self) -> Result<ConditionSet, serde_json::Error> {
        decode(&self.conditions_json)
    }
}

/// Request body for registering a new alert rule.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAlertRequest {
    pub guild_id: String,
    pub webhook_url: String,
    pub conditions_json: String,
}

impl CreateAlertRequest {
    pub fn new(
        guild_id: &str,
        webhook_url: &str,
        conditions: &ConditionSet,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            guild_id: guild_id.to_string(),
            webhook_url: webhook_url.to_string(),
            conditions_json: serde_json::to_string(conditions)?,
        })
    }
}
