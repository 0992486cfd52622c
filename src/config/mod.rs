use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use twitch_oauth2::{ClientId, Scope};

/// Environment variable name for Twitch Client ID
pub const TWITCH_CLIENT_ID_ENV: &str = "TWITCH_CLIENT_ID";
/// Environment variable name for the followed-streams page size
pub const TWITCH_STREAM_LIMIT_ENV: &str = "TWITCH_STREAM_LIMIT";

// Default configuration values
pub const DEFAULT_STREAM_LIMIT: u32 = 100;
const DEFAULT_AUTH_ENDPOINT: &str = "https://id.twitch.tv/oauth2/authorize";
const DEFAULT_API_BASE: &str = "https://api.twitch.tv";
const DEFAULT_SITE_BASE: &str = "https://www.twitch.tv";
const DEFAULT_BOX_ART_BASE: &str = "https://static-cdn.jtvnw.net/ttv-boxart";
const DEFAULT_SOURCE_LABEL: &str = "Twitch";

/// Configuration for the Twitch followed-streams adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    /// Client ID of the registered Twitch application
    pub client_id: String,
    /// Max number of streams to fetch
    #[serde(default = "default_stream_limit")]
    pub stream_limit: u32,
    /// Permission scopes requested during authorization
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Authorization endpoint for the implicit grant
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    /// Base URL of the Helix API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL for channel and directory links
    #[serde(default = "default_site_base")]
    pub site_base: String,
    /// Base URL for game box art
    #[serde(default = "default_box_art_base")]
    pub box_art_base: String,
    /// Label reported alongside request counts
    #[serde(default = "default_source_label")]
    pub source_label: String,
}

// Default functions
fn default_stream_limit() -> u32 {
    DEFAULT_STREAM_LIMIT
}

fn default_scopes() -> Vec<String> {
    vec![Scope::UserReadFollows.to_string()]
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_site_base() -> String {
    DEFAULT_SITE_BASE.to_string()
}

fn default_box_art_base() -> String {
    DEFAULT_BOX_ART_BASE.to_string()
}

fn default_source_label() -> String {
    DEFAULT_SOURCE_LABEL.to_string()
}

impl TwitchConfig {
    /// Create a configuration with default endpoints for the given client ID
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            stream_limit: default_stream_limit(),
            scopes: default_scopes(),
            auth_endpoint: default_auth_endpoint(),
            api_base: default_api_base(),
            site_base: default_site_base(),
            box_art_base: default_box_art_base(),
            source_label: default_source_label(),
        }
    }

    /// Point API requests at a different host (used against mock servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the number of streams requested
    pub fn with_stream_limit(mut self, stream_limit: u32) -> Self {
        self.stream_limit = stream_limit;
        self
    }

    /// Build the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = match std::env::var(TWITCH_CLIENT_ID_ENV) {
            Ok(client_id) if !client_id.trim().is_empty() => client_id.trim().to_string(),
            Ok(_) => return Err(anyhow!("{} environment variable is empty", TWITCH_CLIENT_ID_ENV)),
            Err(_) => {
                return Err(anyhow!(
                    "{} environment variable is not set",
                    TWITCH_CLIENT_ID_ENV
                ))
            }
        };

        let stream_limit = match std::env::var(TWITCH_STREAM_LIMIT_ENV) {
            Ok(val) => val.parse().with_context(|| {
                format!("{} must be a positive integer", TWITCH_STREAM_LIMIT_ENV)
            })?,
            Err(_) => DEFAULT_STREAM_LIMIT,
        };

        let config = Self::new(client_id).with_stream_limit(stream_limit);
        config.validate()?;
        debug!(stream_limit = config.stream_limit, "Loaded Twitch configuration from environment");
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let config: Self = serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration in {}", path.display()))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the adapter cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow!("client_id must not be empty"));
        }
        if self.stream_limit == 0 {
            return Err(anyhow!("stream_limit must be greater than zero"));
        }
        Ok(())
    }

    /// The client ID as a typed Twitch identifier
    pub fn client_id(&self) -> ClientId {
        ClientId::new(self.client_id.clone())
    }
}
