//! Tailoring session row — bookkeeping for one chat-driven tailoring run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `tailoring_sessions`. `baseline` holds the serialized
/// `ResumeDocument` the session's preview projection starts from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TailoringSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub baseline: Value,
    pub jd_text: Option<String>,
    pub created_at: DateTime<Utc>,
}
