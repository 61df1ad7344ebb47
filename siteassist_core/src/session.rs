//! Per-user conversation session state.
//!
//! A session carries two parallel histories: the LLM history (system prompt
//! first, then alternating turns) sent verbatim to the backend, and the
//! display history (the user-visible transcript, no system prompt). Every
//! turn is appended to both, so the display history is always the LLM
//! history with the leading system message stripped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChatMessage, Role};

/// A user's conversation session with both histories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Owning user identity
    pub user_id: String,
    /// Full context sent to the backend, starts with the system prompt
    pub llm_history: Vec<ChatMessage>,
    /// User-visible transcript, system prompt excluded
    pub display_history: Vec<ChatMessage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a fresh session for `user_id`: system prompt into the LLM
    /// history only, then the greeting appended to both as the first
    /// assistant turn.
    #[must_use]
    pub fn bootstrap(user_id: &str, system_prompt: &str, greeting: &str) -> Self {
        let now = Utc::now();
        let mut session = Self {
            user_id: user_id.to_string(),
            llm_history: vec![ChatMessage::system(system_prompt)],
            display_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        session.push_turn(ChatMessage::assistant(greeting));
        session
    }

    /// Append one conversation turn to both histories.
    ///
    /// Callers only pass `user` or `assistant` messages; the system prompt
    /// is placed once at bootstrap and never re-appended.
    pub fn push_turn(&mut self, message: ChatMessage) {
        self.llm_history.push(message.clone());
        self.display_history.push(message);
        self.updated_at = Utc::now();
    }

    /// Number of user/assistant turns (greeting included).
    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.display_history.len()
    }

    /// Whether the two histories still satisfy the dual-history invariant:
    /// exactly one leading system message, display history identical to the
    /// remainder.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let Some((first, rest)) = self.llm_history.split_first() else {
            return false;
        };
        first.role == Role::System
            && rest.iter().all(|m| m.role != Role::System)
            && rest == self.display_history.as_slice()
    }
}
