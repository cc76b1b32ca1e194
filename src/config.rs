//! Environment-driven configuration, read once at startup.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("missing required environment variable {0}")]
pub struct MissingEnv(pub &'static str);

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    /// Public base URL this server is reachable on; the webhook is registered
    /// under it.
    pub server_url: String,
    pub project_id: String,
    pub location_id: String,
    pub agent_id: String,
    pub language_code: String,
    /// Bearer token for the Dialogflow REST API. Optional so the bot can
    /// start without credentials; intent calls will then fail auth.
    pub gcp_access_token: Option<String>,
    pub port: u16,
}

fn require(name: &'static str) -> Result<String, MissingEnv> {
    std::env::var(name).map_err(|_| MissingEnv(name))
}

impl Config {
    pub fn from_env() -> Result<Self, MissingEnv> {
        Ok(Self {
            telegram_token: require("TELEGRAM_TOKEN")?,
            server_url: require("SERVER_URL")?,
            project_id: require("PROJECT_ID")?,
            location_id: require("LOCATION_ID")?,
            agent_id: require("AGENT_ID")?,
            language_code: std::env::var("LANGUAGE_CODE").unwrap_or_else(|_| "ru".to_string()),
            gcp_access_token: std::env::var("GCP_ACCESS_TOKEN").ok(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
        })
    }

    pub fn webhook_url(&self) -> String {
        format!(
            "{}/webhook/{}",
            self.server_url.trim_end_matches('/'),
            self.telegram_token
        )
    }
}
