use async_trait::async_trait;
use chatbridge_core::{ContextVariables, Turn, TurnRecorder};
use chatbridge_entities::{context_variables, conversation_turns};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Schema, Set,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::convert;

pub struct ConversationStore {
    db: DatabaseConnection,
}

impl ConversationStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to conversation store");
        let db = Database::connect(database_url).await?;
        Self::from_connection(db).await
    }

    /// Wrap an open connection, creating missing tables.
    pub async fn from_connection(db: DatabaseConnection) -> anyhow::Result<Self> {
        Self::create_table(&db, conversation_turns::Entity).await?;
        Self::create_table(&db, context_variables::Entity).await?;
        info!("ConversationStore initialized");
        Ok(Self { db })
    }

    async fn create_table<E: EntityTrait>(
        db: &DatabaseConnection,
        entity: E,
    ) -> anyhow::Result<()> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(entity);
        stmt.if_not_exists();
        db.execute_unprepared(&backend.build(&stmt).to_string())
            .await?;
        Ok(())
    }

    /// Recorded turns of one session, oldest first.
    pub async fn turns_for_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> anyhow::Result<Vec<Turn>> {
        conversation_turns::Entity::find()
            .filter(conversation_turns::Column::UserId.eq(user_id))
            .filter(conversation_turns::Column::SessionId.eq(session_id))
            .order_by_asc(conversation_turns::Column::CreatedAt)
            .order_by_asc(conversation_turns::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(convert::model_to_turn)
            .collect()
    }

    pub async fn context_variables(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> anyhow::Result<Option<ContextVariables>> {
        let model =
            context_variables::Entity::find_by_id((user_id.to_owned(), session_id.to_owned()))
                .one(&self.db)
                .await?;

        model
            .map(|m| serde_json::from_value(m.variables).map_err(Into::into))
            .transpose()
    }
}

#[async_trait]
impl TurnRecorder for ConversationStore {
    async fn record_turn(&self, turn: &Turn) -> anyhow::Result<()> {
        conversation_turns::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(turn.user_id.clone()),
            session_id: Set(turn.session_id.clone()),
            speaker: Set(turn.speaker.as_str().to_string()),
            content: Set(serde_json::to_value(&turn.content)?),
            timestamp: Set(turn.timestamp.clone()),
            created_at: Set(chrono::Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await?;

        debug!(
            "Recorded {} turn for user {} in session {}",
            turn.speaker, turn.user_id, turn.session_id
        );
        Ok(())
    }

    async fn record_context_variables(
        &self,
        user_id: &str,
        session_id: &str,
        variables: &ContextVariables,
    ) -> anyhow::Result<()> {
        let now = chrono::Utc::now().naive_utc();
        let variables_json = serde_json::Value::Object(variables.clone());

        let model = context_variables::ActiveModel {
            user_id: Set(user_id.to_owned()),
            session_id: Set(session_id.to_owned()),
            variables: Set(variables_json),
            updated_at: Set(now),
        };

        context_variables::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    context_variables::Column::UserId,
                    context_variables::Column::SessionId,
                ])
                .update_columns([
                    context_variables::Column::Variables,
                    context_variables::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!("Updated context variables for user {user_id} in session {session_id}");
        Ok(())
    }
}
