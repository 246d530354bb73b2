//! Startup configuration for the bot

use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Required startup values.
///
/// Both fields are mandatory: the host treats a load failure as fatal and
/// exits before connecting to the chat platform.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Authentication token for the chat platform gateway.
    pub bot_token: String,
    /// Base URL of the remote alert rule service.
    pub alert_api_base_url: String,
}

impl BotConfig {
    /// Load configuration from the environment.
    ///
    /// Sources, later ones winning: an optional config file named by
    /// `ALERT_BOT_CONFIG_PATH`, `ALERT_BOT__*` environment variables, and the
    /// plain `BOT_TOKEN` / `ALERT_API_BASE_URL` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bot_token", "")?
            .set_default("alert_api_base_url", "")?;

        if let Ok(config_path) = env::var("ALERT_BOT_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALERT_BOT")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(token) = env::var("BOT_TOKEN") {
            builder = builder.set_override("bot_token", token)?;
        }
        if let Ok(base_url) = env::var("ALERT_API_BASE_URL") {
            builder = builder.set_override("alert_api_base_url", base_url)?;
        }

        let config: BotConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bot_token.is_empty() {
            return Err("BOT_TOKEN is required".to_string());
        }

        if self.alert_api_base_url.trim_end_matches('/').is_empty() {
            return Err("ALERT_API_BASE_URL is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: &str, base_url: &str) -> BotConfig {
        BotConfig {
            bot_token: token.to_string(),
            alert_api_base_url: base_url.to_string(),
        }
    }

    #[test]
    fn both_values_are_required() {
        assert!(config("t0ken", "http://alerts.internal").validate().is_ok());
        assert!(config("", "http://alerts.internal").validate().is_err());
        assert!(config("t0ken", "").validate().is_err());
    }

    #[test]
    fn a_slash_only_base_url_counts_as_unset() {
        assert!(config("t0ken", "///").validate().is_err());
    }
}
