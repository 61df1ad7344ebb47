#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod locks;
pub mod session;

pub use locks::UserLocks;
pub use session::Session;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Errors surfaced by the remote assistant backend adapter.
///
/// Each variant is terminal for the request that produced it; no layer
/// above the adapter retries automatically.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("backend rejected the configured API key (HTTP 401)")]
    Unauthorized,

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("malformed backend reply: {0}")]
    InvalidReply(String),

    #[error("invalid chat history: {0}")]
    InvalidHistory(String),
}

/// Remote assistant backend: one synchronous call per conversation turn,
/// plus the one-shot provisioning check used at activation.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Send the full LLM history for `site_url` and return the assistant
    /// reply the backend appended.
    async fn send(
        &self,
        site_url: &str,
        history: &[ChatMessage],
    ) -> Result<ChatMessage, AssistantError>;

    /// Check whether the backend has a knowledge database for `site_url`.
    async fn provision_site(&self, site_url: &str) -> Result<bool, AssistantError>;
}

/// Per-user persistent session storage.
///
/// The get-modify-put cycle for a user must run while holding that user's
/// lock from [`SessionStore::user_lock`]; the store itself never blocks one
/// user's operations on another's.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session for `user_id`, or build a fresh bootstrap
    /// session (system prompt plus greeting turn) without persisting it.
    /// Repeated calls for a user with no stored row return the same
    /// bootstrap content; an existing row is never re-seeded.
    async fn get_or_create(&self, user_id: &str) -> anyhow::Result<Session>;

    /// Persist the session, keyed by its user id. Upsert semantics.
    async fn save(&self, session: &Session) -> anyhow::Result<()>;

    /// Delete the stored session. Clearing a nonexistent session succeeds.
    async fn clear(&self, user_id: &str) -> anyhow::Result<()>;

    /// All user ids with a stored session, for the deactivation sweep.
    async fn list_users(&self) -> anyhow::Result<Vec<String>>;

    /// Mutual-exclusion token for `user_id`. Holding the locked guard
    /// serializes read-modify-write cycles for that user only.
    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>>;
}

#[async_trait]
impl<T: AssistantBackend + ?Sized> AssistantBackend for Arc<T> {
    async fn send(
        &self,
        site_url: &str,
        history: &[ChatMessage],
    ) -> Result<ChatMessage, AssistantError> {
        (**self).send(site_url, history).await
    }

    async fn provision_site(&self, site_url: &str) -> Result<bool, AssistantError> {
        (**self).provision_site(site_url).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_or_create(&self, user_id: &str) -> anyhow::Result<Session> {
        (**self).get_or_create(user_id).await
    }

    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        (**self).save(session).await
    }

    async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
        (**self).clear(user_id).await
    }

    async fn list_users(&self) -> anyhow::Result<Vec<String>> {
        (**self).list_users().await
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        (**self).user_lock(user_id)
    }
}
