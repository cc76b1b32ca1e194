//! Dialogflow CX intent-detection client
//!
//! The bot never interprets user queries itself; it forwards them to a
//! Dialogflow CX agent and parses the free-text reply. The dispatcher depends
//! on the [`IntentClient`] trait so tests can queue canned replies.

use crate::config::Config;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("intent request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("intent api error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Client for the conversational backend.
#[async_trait]
pub trait IntentClient: Send + Sync {
    /// Detect intent for `text` within the per-chat session `session_id`.
    /// `page` carries the requested result page for hotel searches; detail
    /// lookups pass `None`.
    async fn detect_intent(
        &self,
        session_id: i64,
        text: &str,
        page: Option<u32>,
    ) -> Result<IntentResponse, IntentError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    #[serde(default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub response_messages: Vec<ResponseMessage>,
    #[serde(default)]
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub text: Option<TextBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default)]
    pub display_name: String,
}

impl IntentResponse {
    /// True when the agent returned no messages at all.
    pub fn is_empty(&self) -> bool {
        self.query_result.response_messages.is_empty()
    }

    /// All text fragments of all response messages, newline-joined. This is
    /// the string the parsers consume.
    pub fn joined_text(&self) -> String {
        self.query_result
            .response_messages
            .iter()
            .map(|m| {
                m.text
                    .as_ref()
                    .map(|t| t.text.concat())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds a single-message response; used by tests and mocks.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            query_result: QueryResult {
                response_messages: vec![ResponseMessage {
                    text: Some(TextBlock {
                        text: vec![text.into()],
                    }),
                }],
                intent: None,
            },
        }
    }
}

/// REST client for a Dialogflow CX agent.
pub struct DialogflowClient {
    client: reqwest::Client,
    session_base: String,
    language_code: String,
    access_token: Option<String>,
}

impl DialogflowClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        let session_base = format!(
            "https://{loc}-dialogflow.googleapis.com/v3/projects/{proj}/locations/{loc}/agents/{agent}/sessions",
            loc = config.location_id,
            proj = config.project_id,
            agent = config.agent_id,
        );
        Self {
            client,
            session_base,
            language_code: config.language_code.clone(),
            access_token: config.gcp_access_token.clone(),
        }
    }
}

#[async_trait]
impl IntentClient for DialogflowClient {
    async fn detect_intent(
        &self,
        session_id: i64,
        text: &str,
        page: Option<u32>,
    ) -> Result<IntentResponse, IntentError> {
        // For follow-up pages the agent expects the page phrasing, not the
        // original query text.
        let query_text = match page {
            Some(page) if page > 1 => format!("покажи страницу {page}"),
            _ => text.to_string(),
        };

        let mut body = json!({
            "queryInput": {
                "text": { "text": query_text },
                "languageCode": self.language_code,
            },
        });
        if let Some(page) = page {
            body["queryParams"] = json!({ "parameters": { "page": page } });
        }

        tracing::debug!(session_id, page, query = %query_text, "detect intent");

        let mut request = self
            .client
            .post(format!("{}/{}:detectIntent", self.session_base, session_id))
            .json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IntentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: IntentResponse = response.json().await?;
        tracing::debug!(
            session_id,
            intent = parsed
                .query_result
                .intent
                .as_ref()
                .map(|i| i.display_name.as_str())
                .unwrap_or("undefined"),
            messages = parsed.query_result.response_messages.len(),
            "intent response"
        );
        Ok(parsed)
    }
}
