use crate::{Error, Result, TokenValidator};
use serde::{Deserialize, Serialize};
use siteassist_conversation::ChatManager;
use siteassist_core::{AssistantBackend, SessionStore};
use tracing::info;

/// A chat submission from the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub token: String,
    pub text: String,
}

/// A conversation reset from the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    pub user_id: String,
    pub token: String,
}

/// The assistant's reply, ready for the adapter to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
}

fn authorize(validator: &TokenValidator, user_id: &str, token: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(Error::Unauthenticated);
    }
    if !validator.validate(user_id, token) {
        return Err(Error::InvalidToken);
    }
    Ok(())
}

/// Handle one chat submission: validate identity and token, then run the
/// turn through the session manager.
pub async fn submit_message<B, S>(
    manager: &ChatManager<B, S>,
    validator: &TokenValidator,
    request: ChatRequest,
) -> Result<ChatReply>
where
    B: AssistantBackend,
    S: SessionStore,
{
    authorize(validator, &request.user_id, &request.token)?;

    info!("[{}] Message: {}", request.user_id, request.text);
    let text = manager
        .handle_user_message(&request.user_id, &request.text)
        .await?;

    Ok(ChatReply { text })
}

/// Handle a reset request: validate, then clear the user's session.
pub async fn reset_conversation<B, S>(
    manager: &ChatManager<B, S>,
    validator: &TokenValidator,
    request: ResetRequest,
) -> Result<()>
where
    B: AssistantBackend,
    S: SessionStore,
{
    authorize(validator, &request.user_id, &request.token)?;

    info!("[{}] Reset", request.user_id);
    manager.reset_conversation(&request.user_id).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use siteassist_conversation::SiteReadiness;
    use siteassist_core::{
        AssistantError, ChatMessage, Role, Session, SessionStore, UserLocks,
    };
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct EchoBackend;

    #[async_trait]
    impl AssistantBackend for EchoBackend {
        async fn send(
            &self,
            _site_url: &str,
            history: &[ChatMessage],
        ) -> std::result::Result<ChatMessage, AssistantError> {
            let last = history
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map_or("nothing", |m| m.content.as_str());
            Ok(ChatMessage::assistant(format!("re: {last}")))
        }

        async fn provision_site(
            &self,
            _site_url: &str,
        ) -> std::result::Result<bool, AssistantError> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct MapStore {
        sessions: Mutex<HashMap<String, Session>>,
        locks: UserLocks,
    }

    #[async_trait]
    impl SessionStore for MapStore {
        async fn get_or_create(&self, user_id: &str) -> anyhow::Result<Session> {
            Ok(self
                .sessions
                .lock()
                .await
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| Session::bootstrap(user_id, "prompt", "hello")))
        }

        async fn save(&self, session: &Session) -> anyhow::Result<()> {
            self.sessions
                .lock()
                .await
                .insert(session.user_id.clone(), session.clone());
            Ok(())
        }

        async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
            self.sessions.lock().await.remove(user_id);
            Ok(())
        }

        async fn list_users(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.sessions.lock().await.keys().cloned().collect())
        }

        fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
            self.locks.acquire(user_id)
        }
    }

    fn manager() -> ChatManager<EchoBackend, Arc<MapStore>> {
        ChatManager::new(
            EchoBackend,
            Arc::new(MapStore::default()),
            "https://www.example.com".to_string(),
            Arc::new(SiteReadiness::ready()),
        )
    }

    #[tokio::test]
    async fn test_valid_request_reaches_manager() {
        let mgr = manager();
        let validator = TokenValidator::new("secret".to_string());

        let reply = submit_message(
            &mgr,
            &validator,
            ChatRequest {
                user_id: "user:1".to_string(),
                token: validator.issue("user:1"),
                text: "hello".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(reply.text, "re: hello");
    }

    #[tokio::test]
    async fn test_bad_token_rejected_before_store_access() {
        let mgr = manager();
        let validator = TokenValidator::new("secret".to_string());

        let err = submit_message(
            &mgr,
            &validator,
            ChatRequest {
                user_id: "user:1".to_string(),
                token: "forged".to_string(),
                text: "hello".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidToken));
        assert!(mgr.store().list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_rejected() {
        let mgr = manager();
        let validator = TokenValidator::new("secret".to_string());

        let err = reset_conversation(
            &mgr,
            &validator,
            ResetRequest {
                user_id: String::new(),
                token: validator.issue(""),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn test_reset_clears_persisted_session() {
        let mgr = manager();
        let validator = TokenValidator::new("secret".to_string());
        let token = validator.issue("user:1");

        submit_message(
            &mgr,
            &validator,
            ChatRequest {
                user_id: "user:1".to_string(),
                token: token.clone(),
                text: "hello".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(mgr.store().list_users().await.unwrap().len(), 1);

        reset_conversation(
            &mgr,
            &validator,
            ResetRequest {
                user_id: "user:1".to_string(),
                token,
            },
        )
        .await
        .unwrap();
        assert!(mgr.store().list_users().await.unwrap().is_empty());
    }
}
