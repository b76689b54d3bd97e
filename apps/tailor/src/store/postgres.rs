//! PostgreSQL turn store.
//!
//! Two tables carry the log: `chat_turns` (one row per turn, `seq` preserves
//! log order across replacements) and `chat_fragments` (the codec row shape,
//! one row per fragment). Turn replacement runs in a single transaction:
//! upsert the turn row keeping its `seq`, delete the old fragment set, insert
//! the new one. A concurrent reader never observes a partial write.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::codec::{self, FragmentRow};
use crate::errors::TailorError;
use crate::models::resume::ResumeDocument;
use crate::models::session::TailoringSessionRow;
use crate::models::turn::{Role, Turn};
use crate::store::TurnStore;

const CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS tailoring_sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    baseline JSONB NOT NULL,
    jd_text TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_TURNS: &str = r#"
CREATE TABLE IF NOT EXISTS chat_turns (
    session_id UUID NOT NULL,
    message_id TEXT NOT NULL,
    role TEXT NOT NULL,
    seq BIGSERIAL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (session_id, message_id)
)
"#;

const CREATE_FRAGMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS chat_fragments (
    session_id UUID NOT NULL,
    message_id TEXT NOT NULL,
    ord INTEGER NOT NULL,
    type TEXT NOT NULL,
    text TEXT,
    reasoning TEXT,
    provider_metadata JSONB,
    tool_call_id TEXT,
    tool_name TEXT,
    tool_state TEXT,
    tool_input JSONB,
    tool_output JSONB,
    tool_error TEXT,
    PRIMARY KEY (session_id, message_id, ord)
)
"#;

#[derive(FromRow)]
struct TurnRow {
    message_id: String,
    role: String,
}

pub struct PgTurnStore {
    pool: PgPool,
}

impl PgTurnStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a fresh pool and wraps it in a store.
    pub async fn connect(database_url: &str) -> Result<Self, TailorError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }

    /// Creates the session/turn/fragment tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), TailorError> {
        sqlx::query(CREATE_SESSIONS).execute(&self.pool).await?;
        sqlx::query(CREATE_TURNS).execute(&self.pool).await?;
        sqlx::query(CREATE_FRAGMENTS).execute(&self.pool).await?;
        Ok(())
    }

    /// Creates a tailoring session and returns its id.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        baseline: &ResumeDocument,
        jd_text: Option<&str>,
    ) -> Result<Uuid, TailorError> {
        let id = Uuid::new_v4();
        let baseline_json = serde_json::to_value(baseline)
            .map_err(|e| TailorError::Codec(format!("baseline serialization failed: {e}")))?;
        sqlx::query(
            "INSERT INTO tailoring_sessions (id, user_id, baseline, jd_text) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(user_id)
        .bind(&baseline_json)
        .bind(jd_text)
        .execute(&self.pool)
        .await?;

        info!("Created tailoring session {id} for user {user_id}");
        Ok(id)
    }

    pub async fn load_session(&self, id: Uuid) -> Result<TailoringSessionRow, TailorError> {
        sqlx::query_as::<_, TailoringSessionRow>(
            "SELECT * FROM tailoring_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TailorError::NotFound(format!("Session {id} not found")))
    }

    /// Deserializes a session's stored baseline document.
    pub fn baseline_of(session: &TailoringSessionRow) -> Result<ResumeDocument, TailorError> {
        serde_json::from_value(session.baseline.clone())
            .map_err(|e| TailorError::Codec(format!("stored baseline is not a ResumeDocument: {e}")))
    }
}

#[async_trait]
impl TurnStore for PgTurnStore {
    async fn append_or_replace_turn(
        &self,
        session_id: Uuid,
        turn: &Turn,
    ) -> Result<(), TailorError> {
        let mut tx = self.pool.begin().await?;

        // Upsert the turn row. On replacement the existing `seq` is kept, so
        // the turn stays at its original log position.
        sqlx::query(
            r#"
            INSERT INTO chat_turns (session_id, message_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id, message_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(session_id)
        .bind(&turn.id)
        .bind(turn.role.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM chat_fragments WHERE session_id = $1 AND message_id = $2")
            .bind(session_id)
            .bind(&turn.id)
            .execute(&mut *tx)
            .await?;

        for (i, fragment) in turn.fragments.iter().enumerate() {
            let row = codec::encode(fragment, &turn.id, i as i32);
            insert_fragment(&mut tx, session_id, &row).await?;
        }

        tx.commit().await?;
        info!(
            "Wrote turn {} ({} fragments) to session {session_id}",
            turn.id,
            turn.fragments.len()
        );
        Ok(())
    }

    async fn read_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, TailorError> {
        let turn_rows: Vec<TurnRow> = sqlx::query_as(
            "SELECT message_id, role FROM chat_turns WHERE session_id = $1 ORDER BY seq",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let fragment_rows: Vec<FragmentRow> = sqlx::query_as(
            r#"
            SELECT message_id, ord, type, text, reasoning, provider_metadata,
                   tool_call_id, tool_name, tool_state, tool_input, tool_output, tool_error
            FROM chat_fragments
            WHERE session_id = $1
            ORDER BY message_id, ord
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_message: std::collections::HashMap<String, Vec<FragmentRow>> =
            std::collections::HashMap::new();
        for row in fragment_rows {
            by_message.entry(row.message_id.clone()).or_default().push(row);
        }

        let mut turns = Vec::with_capacity(turn_rows.len());
        for turn_row in turn_rows {
            let role = Role::parse(&turn_row.role).ok_or_else(|| {
                TailorError::Codec(format!(
                    "unknown role '{}' on turn {}",
                    turn_row.role, turn_row.message_id
                ))
            })?;
            let rows = by_message.remove(&turn_row.message_id).unwrap_or_default();
            if rows.is_empty() {
                // Crashed write left a turn without fragments; invalid, skip.
                continue;
            }
            let fragments = rows
                .iter()
                .map(codec::decode)
                .collect::<Result<Vec<_>, _>>()?;
            turns.push(Turn::new(turn_row.message_id, role, fragments));
        }
        Ok(turns)
    }
}

async fn insert_fragment(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session_id: Uuid,
    row: &FragmentRow,
) -> Result<(), TailorError> {
    sqlx::query(
        r#"
        INSERT INTO chat_fragments
            (session_id, message_id, ord, type, text, reasoning, provider_metadata,
             tool_call_id, tool_name, tool_state, tool_input, tool_output, tool_error)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(session_id)
    .bind(&row.message_id)
    .bind(row.ord)
    .bind(&row.row_type)
    .bind(&row.text)
    .bind(&row.reasoning)
    .bind(&row.provider_metadata)
    .bind(&row.tool_call_id)
    .bind(&row.tool_name)
    .bind(&row.tool_state)
    .bind(&row.tool_input)
    .bind(&row.tool_output)
    .bind(&row.tool_error)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
