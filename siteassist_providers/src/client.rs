use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use siteassist_core::{AssistantBackend, AssistantError, ChatMessage, Role};
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the assistant backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://assistant.example.com`
    pub base_url: String,
    /// Static bearer credential, configured once per deployment
    pub api_key: String,
    /// Hard per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stateless client for the backend's `/chat` and `/db` endpoints.
///
/// One authenticated call per operation, no retry; transport failures and
/// non-200 statuses map onto [`AssistantError`] and are terminal for the
/// request that hit them.
pub struct HttpAssistantClient {
    client: Client,
    config: BackendConfig,
}

impl HttpAssistantClient {
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        info!("Creating assistant backend client for {}", config.base_url);
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String, AssistantError> {
        let response = self
            .client
            .post(format!("{}{path}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AssistantError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AssistantError::Unreachable(e.to_string()))?;

        classify_response(status, text)
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantClient {
    async fn send(
        &self,
        site_url: &str,
        history: &[ChatMessage],
    ) -> Result<ChatMessage, AssistantError> {
        check_history(history)?;

        debug!("Sending {} messages to backend /chat", history.len());
        let body = json!({
            "site_url": site_url,
            "messages": history,
        });
        let text = self.post("/chat", &body).await?;
        let reply = parse_chat_body(&text)?;

        debug!("Backend replied with {} chars", reply.content.len());
        Ok(reply)
    }

    async fn provision_site(&self, site_url: &str) -> Result<bool, AssistantError> {
        info!("Checking backend database for {site_url}");
        let body = json!({ "site_url": site_url });
        let text = self.post("/db", &body).await?;
        parse_db_body(&text)
    }
}

/// Reject histories the backend contract forbids before spending a call.
fn check_history(history: &[ChatMessage]) -> Result<(), AssistantError> {
    match history.first() {
        None => Err(AssistantError::InvalidHistory(
            "history is empty".to_string(),
        )),
        Some(first) if first.role != Role::System => Err(AssistantError::InvalidHistory(
            "history must start with the system message".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

/// Map an HTTP status onto the error taxonomy; 200 passes the body through.
fn classify_response(status: u16, body: String) -> Result<String, AssistantError> {
    match status {
        200 => Ok(body),
        401 => Err(AssistantError::Unauthorized),
        _ => Err(AssistantError::Backend { status, body }),
    }
}

/// The `/chat` response is the full updated history; the turn's result is
/// its last message, which must be an assistant turn.
fn parse_chat_body(body: &str) -> Result<ChatMessage, AssistantError> {
    let messages: Vec<ChatMessage> = serde_json::from_str(body)
        .map_err(|e| AssistantError::InvalidReply(format!("not a message array: {e}")))?;

    let last = messages
        .into_iter()
        .next_back()
        .ok_or_else(|| AssistantError::InvalidReply("empty message array".to_string()))?;

    if last.role == Role::Assistant {
        Ok(last)
    } else {
        Err(AssistantError::InvalidReply(
            "last message is not an assistant turn".to_string(),
        ))
    }
}

fn parse_db_body(body: &str) -> Result<bool, AssistantError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::InvalidReply(format!("not a JSON object: {e}")))?;

    value["database_present"]
        .as_bool()
        .ok_or_else(|| AssistantError::InvalidReply("missing 'database_present'".to_string()))
}
