use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use alert_api_common::{AlertRule, ApiError, ConditionSet, CreateAlertRequest};

/// Client for the remote alert rule service.
///
/// Holds one pooled HTTP client and no other state, so a single instance can
/// serve any number of concurrent command invocations without locking.
pub struct AlertApiClient {
    client: Client,
    base_url: String,
}

impl AlertApiClient {
    /// Build a client for the service at `base_url`. Trailing slashes are
    /// trimmed; an empty URL is rejected here as well as at config load.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        anyhow::ensure!(!base_url.is_empty(), "alert service base URL must not be empty");

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Register a new alert rule and return the stored rule.
    ///
    /// Success is exactly HTTP 200 with a rule body; every other status maps
    /// to [`ApiError::Rejected`] with the remote detail message.
    pub async fn create_alert(
        &self,
        guild_id: &str,
        webhook_url: &str,
        conditions: &ConditionSet,
    ) -> Result<AlertRule, ApiError> {
        let request = CreateAlertRequest::new(guild_id, webhook_url, conditions)
            .map_err(|e| ApiError::Unexpected(format!("failed to encode conditions: {}", e)))?;

        let response = self
            .client
            .post(format!("{}/api/v1/alerts", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("create alert request failed: {}", e);
                ApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body, false));
        }

        let rule: AlertRule = response.json().await.map_err(|e| {
            error!("could not parse created alert: {}", e);
            ApiError::Unexpected(format!("invalid response body: {}", e))
        })?;

        debug!("created alert {} for guild {}", rule.alert_id, guild_id);
        Ok(rule)
    }

    /// List the rules registered for a space. An empty list is a valid,
    /// non-error result.
    pub async fn list_alerts(&self, guild_id: &str) -> Result<Vec<AlertRule>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/alerts", self.base_url))
            .query(&[("guild_id", guild_id)])
            .send()
            .await
            .map_err(|e| {
                error!("list alerts request failed: {}", e);
                ApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body, false));
        }

        response.json().await.map_err(|e| {
            error!("could not parse alert listing: {}", e);
            ApiError::Unexpected(format!("invalid response body: {}", e))
        })
    }

    /// Delete a rule by identifier. Success is exactly HTTP 204; a 404 maps
    /// to a rejection that [`ApiError::is_not_found`] recognizes, and for
    /// other failures a non-JSON error body becomes the detail verbatim.
    pub async fn remove_alert(&self, alert_id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(format!("{}/api/v1/alerts/{}", self.base_url, alert_id))
            .send()
            .await
            .map_err(|e| {
                error!("remove alert request failed: {}", e);
                ApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!("removed alert {}", alert_id);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &body, true))
    }
}

/// Map a non-success response to [`ApiError::Rejected`].
///
/// The detail is taken from the body's `detail` field when the body parses as
/// JSON. Otherwise the delete path keeps the raw text body; other paths fall
/// back to a generic placeholder.
fn rejection(status: u16, body: &str, raw_body_fallback: bool) -> ApiError {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(parsed) => parsed
            .get("detail")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) if raw_body_fallback && !body.is_empty() => body.to_string(),
        Err(_) => "unknown error".to_string(),
    };

    ApiError::Rejected { status, detail }
}
