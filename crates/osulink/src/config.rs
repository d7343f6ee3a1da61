//! Bot configuration.
//!
//! Loaded from a JSON file. Every section has defaults so tests can start
//! from `BotConfig::default()` and set only what they need.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use osulink_core::DiscordUserId;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub discord: DiscordConfig,
    pub osu: OAuthClientConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub bot_token: String,
    /// Discord id of the administrator. Empty disables the protected identity.
    pub administrator_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Externally reachable base URL, used to build OAuth callback URLs.
    pub public_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
    /// Cookie lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("osulink.db"),
        }
    }
}

impl BotConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let admin = self.discord.administrator_id.trim();
        if !admin.is_empty() && !admin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Invalid(format!(
                "discord.administrator_id must be a numeric id, got {:?}",
                admin
            )));
        }

        let url = self.http.public_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "http.public_url must be an http(s) URL, got {:?}",
                url
            )));
        }

        if self.session.secret.is_empty() {
            tracing::warn!("session.secret is empty; sessions will not be secure");
        }

        Ok(())
    }

    /// The administrator identity, if one is configured.
    pub fn protected_identity(&self) -> Option<DiscordUserId> {
        let admin = self.discord.administrator_id.trim();
        if admin.is_empty() {
            None
        } else {
            Some(DiscordUserId::new(admin))
        }
    }

    fn callback_url(&self, provider: &str) -> String {
        format!(
            "{}/api/auth/{}/callback",
            self.http.public_url.trim().trim_end_matches('/'),
            provider
        )
    }

    pub fn discord_callback_url(&self) -> String {
        self.callback_url("discord")
    }

    pub fn osu_callback_url(&self) -> String {
        self.callback_url("osu")
    }
}
