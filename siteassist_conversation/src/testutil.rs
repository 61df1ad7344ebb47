//! In-memory doubles for the backend and the store, used across this
//! crate's tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use siteassist_core::{
    AssistantBackend, AssistantError, ChatMessage, Role, Session, SessionStore, UserLocks,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const SYSTEM_PROMPT: &str = "You answer questions about this site.";
pub const GREETING: &str = "Hi! Ask me anything about this site.";

/// Scripted backend: queued results are returned first; with an empty
/// queue it echoes the last user turn as `re: <text>`.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<VecDeque<Result<ChatMessage, AssistantError>>>>,
    provision_result: Arc<Mutex<Option<Result<bool, AssistantError>>>>,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each `send` call open for `delay`, to widen race windows in
    /// concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, reply: ChatMessage) {
        self.inner.lock().await.push_back(Ok(reply));
    }

    pub async fn push_error(&self, error: AssistantError) {
        self.inner.lock().await.push_back(Err(error));
    }

    pub async fn set_provision_result(&self, result: Result<bool, AssistantError>) {
        *self.provision_result.lock().await = Some(result);
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn send(
        &self,
        _site_url: &str,
        history: &[ChatMessage],
    ) -> Result<ChatMessage, AssistantError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(result) = self.inner.lock().await.pop_front() {
            return result;
        }

        let last_user = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("nothing", |m| m.content.as_str());
        Ok(ChatMessage::assistant(format!("re: {last_user}")))
    }

    async fn provision_site(&self, _site_url: &str) -> Result<bool, AssistantError> {
        self.provision_result
            .lock()
            .await
            .take()
            .unwrap_or(Ok(true))
    }
}

/// Hash-map store with the same bootstrap and locking contract as the
/// SQLite store.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
    locks: UserLocks,
    fail_clear_for: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `clear` fail for one user, for sweep tests.
    pub async fn fail_clear_for(&self, user_id: &str) {
        self.fail_clear_for.lock().await.insert(user_id.to_string());
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_or_create(&self, user_id: &str) -> anyhow::Result<Session> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Session::bootstrap(user_id, SYSTEM_PROMPT, GREETING)))
    }

    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        self.sessions
            .lock()
            .await
            .insert(session.user_id.clone(), session.clone());
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
        if self.fail_clear_for.lock().await.contains(user_id) {
            anyhow::bail!("simulated clear failure for {user_id}");
        }
        self.sessions.lock().await.remove(user_id);
        Ok(())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<String>> {
        let mut users: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.acquire(user_id)
    }
}
