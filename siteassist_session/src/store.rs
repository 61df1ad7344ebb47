use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Set,
};
use siteassist_core::{ChatMessage, Session, SessionStore, UserLocks};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::entity::sessions;

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Fixed content seeded into every fresh session.
#[derive(Debug, Clone)]
pub struct BootstrapContent {
    /// One-paragraph instruction establishing the assistant's role
    pub system_prompt: String,
    /// Literal greeting shown as the first assistant turn
    pub greeting: String,
}

/// Durable per-user session store over SQLite.
///
/// Rows are keyed by user id and survive restarts until cleared. The store
/// also owns the per-user lock registry that serializes get-modify-put
/// cycles for one user while leaving other users uncontended.
pub struct SqliteSessionStore {
    db: DatabaseConnection,
    bootstrap: BootstrapContent,
    locks: UserLocks,
}

impl SqliteSessionStore {
    pub async fn new(db_path: &Path, bootstrap: BootstrapContent) -> anyhow::Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(&db_url, bootstrap).await
    }

    /// Connect with an explicit URL (`sqlite::memory:` in tests).
    pub async fn connect(db_url: &str, bootstrap: BootstrapContent) -> anyhow::Result<Self> {
        info!("Connecting to session database: {db_url}");
        let db = Database::connect(db_url).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(sessions::Entity);
        match db.execute_unprepared(&backend.build(&stmt).to_string()).await {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                info!("Sessions table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        info!("Session store initialized");
        Ok(Self {
            db,
            bootstrap,
            locks: UserLocks::new(),
        })
    }

    fn session_from_model(model: sessions::Model) -> anyhow::Result<Session> {
        let llm_history: Vec<ChatMessage> = serde_json::from_str(&model.llm_history)?;
        let display_history: Vec<ChatMessage> = serde_json::from_str(&model.display_history)?;

        Ok(Session {
            user_id: model.user_id,
            llm_history,
            display_history,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_or_create(&self, user_id: &str) -> anyhow::Result<Session> {
        let session_model = sessions::Entity::find_by_id(user_id.to_owned())
            .one(&self.db)
            .await?;

        session_model.map_or_else(
            || {
                // Nothing persisted yet; durability begins at the first save.
                Ok(Session::bootstrap(
                    user_id,
                    &self.bootstrap.system_prompt,
                    &self.bootstrap.greeting,
                ))
            },
            Self::session_from_model,
        )
    }

    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        let llm_json = serde_json::to_string(&session.llm_history)?;
        let display_json = serde_json::to_string(&session.display_history)?;
        let created_at = session.created_at.naive_utc();
        let updated_at = session.updated_at.naive_utc();

        let exists = sessions::Entity::find_by_id(session.user_id.clone())
            .one(&self.db)
            .await?
            .is_some();

        let model = sessions::ActiveModel {
            user_id: Set(session.user_id.clone()),
            llm_history: Set(llm_json),
            display_history: Set(display_json),
            created_at: Set(created_at),
            updated_at: Set(updated_at),
        };

        if exists {
            sessions::Entity::update(model).exec(&self.db).await?;
        } else {
            model.insert(&self.db).await?;
        }

        info!("Saved session for user: {}", session.user_id);
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
        sessions::Entity::delete_by_id(user_id.to_owned())
            .exec(&self.db)
            .await?;

        info!("Cleared session for user: {user_id}");
        Ok(())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<String>> {
        let models = sessions::Entity::find().all(&self.db).await?;
        Ok(models.into_iter().map(|m| m.user_id).collect())
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.acquire(user_id)
    }
}
