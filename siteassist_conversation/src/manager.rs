//! The conversation session manager.
//!
//! One `handle_user_message` call is one turn: load or bootstrap the user's
//! session, append the user turn to both histories, forward the full LLM
//! history to the backend, reconcile the reply, persist. The whole cycle
//! runs under the user's store lock, so concurrent submissions from one
//! user serialize instead of racing on the same row; different users never
//! contend.

use crate::{ChatError, SiteReadiness};
use siteassist_core::{AssistantBackend, ChatMessage, SessionStore};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ChatManager<B, S>
where
    B: AssistantBackend,
    S: SessionStore,
{
    backend: B,
    store: S,
    site_url: String,
    readiness: Arc<SiteReadiness>,
}

impl<B, S> ChatManager<B, S>
where
    B: AssistantBackend,
    S: SessionStore,
{
    pub fn new(backend: B, store: S, site_url: String, readiness: Arc<SiteReadiness>) -> Self {
        Self {
            backend,
            store,
            site_url,
            readiness,
        }
    }

    /// Process one user message and return the assistant's reply text.
    ///
    /// Exactly one persisted mutation on success, zero on failure: if the
    /// backend call fails, the session mutated in memory is dropped and the
    /// stored state is left exactly as it was, so the history never ends on
    /// an unanswered user turn.
    pub async fn handle_user_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<String, ChatError> {
        if !self.readiness.is_ready() {
            return Err(ChatError::NotReady);
        }

        let lock = self.store.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut session = self
            .store
            .get_or_create(user_id)
            .await
            .map_err(ChatError::Store)?;

        session.push_turn(ChatMessage::user(text));
        debug!(
            "Turn {} for user {user_id}: sending {} messages",
            session.turn_count(),
            session.llm_history.len()
        );

        let reply = self.backend.send(&self.site_url, &session.llm_history).await?;

        let content = reply.content.clone();
        session.push_turn(reply);
        self.store.save(&session).await.map_err(ChatError::Store)?;

        info!("Completed turn for user {user_id}");
        Ok(content)
    }

    /// Drop the user's stored session. Clearing a user who never chatted
    /// succeeds silently; their next message bootstraps afresh.
    pub async fn reset_conversation(&self, user_id: &str) -> Result<(), ChatError> {
        let lock = self.store.user_lock(user_id);
        let _guard = lock.lock().await;

        self.store.clear(user_id).await.map_err(ChatError::Store)?;
        info!("Reset conversation for user {user_id}");
        Ok(())
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
