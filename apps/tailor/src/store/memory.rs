//! In-memory turn store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::TailorError;
use crate::models::turn::Turn;
use crate::store::TurnStore;

/// Turn store backed by a `HashMap`. The write lock is held for the whole
/// replacement, which gives the same atomicity as the Postgres transaction.
#[derive(Default)]
pub struct MemoryTurnStore {
    sessions: RwLock<HashMap<Uuid, Vec<Turn>>>,
}

impl MemoryTurnStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TurnStore for MemoryTurnStore {
    async fn append_or_replace_turn(
        &self,
        session_id: Uuid,
        turn: &Turn,
    ) -> Result<(), TailorError> {
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(session_id).or_default();
        match log.iter_mut().find(|t| t.id == turn.id) {
            // Replace in place — the turn keeps its original log position.
            Some(existing) => *existing = turn.clone(),
            None => log.push(turn.clone()),
        }
        Ok(())
    }

    async fn read_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, TailorError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&session_id)
            .map(|log| {
                log.iter()
                    .filter(|t| !t.fragments.is_empty())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::turn::{Fragment, Role};

    fn text_turn(id: &str, role: Role, content: &str) -> Turn {
        Turn::new(
            id,
            role,
            vec![Fragment::Text {
                content: content.to_string(),
            }],
        )
    }

    #[tokio::test]
    async fn test_append_preserves_log_order() {
        let store = MemoryTurnStore::new();
        let session = Uuid::new_v4();
        store
            .append_or_replace_turn(session, &text_turn("m1", Role::User, "hi"))
            .await
            .unwrap();
        store
            .append_or_replace_turn(session, &text_turn("m2", Role::Agent, "hello"))
            .await
            .unwrap();

        let turns = store.read_turns(session).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].id, "m1");
        assert_eq!(turns[1].id, "m2");
    }

    #[tokio::test]
    async fn test_replace_keeps_original_position() {
        let store = MemoryTurnStore::new();
        let session = Uuid::new_v4();
        store
            .append_or_replace_turn(session, &text_turn("m1", Role::User, "hi"))
            .await
            .unwrap();
        store
            .append_or_replace_turn(session, &text_turn("m2", Role::Agent, "v1"))
            .await
            .unwrap();
        store
            .append_or_replace_turn(session, &text_turn("m1", Role::User, "edited"))
            .await
            .unwrap();

        let turns = store.read_turns(session).await.unwrap();
        assert_eq!(turns.len(), 2, "replacement must not duplicate the turn");
        assert_eq!(turns[0].id, "m1", "replaced turn keeps its position");
        assert_eq!(
            turns[0].fragments,
            vec![Fragment::Text {
                content: "edited".to_string()
            }],
            "replacement is a full fragment-list overwrite"
        );
    }

    #[tokio::test]
    async fn test_read_excludes_fragmentless_turns() {
        let store = MemoryTurnStore::new();
        let session = Uuid::new_v4();
        store
            .append_or_replace_turn(session, &text_turn("m1", Role::User, "hi"))
            .await
            .unwrap();
        // Simulates a crashed write that persisted a turn without fragments.
        store
            .append_or_replace_turn(session, &Turn::new("m2", Role::Agent, vec![]))
            .await
            .unwrap();

        let turns = store.read_turns(session).await.unwrap();
        assert_eq!(turns.len(), 1, "fragmentless turn must be excluded");
        assert_eq!(turns[0].id, "m1");
    }

    #[tokio::test]
    async fn test_unknown_session_reads_empty() {
        let store = MemoryTurnStore::new();
        let turns = store.read_turns(Uuid::new_v4()).await.unwrap();
        assert!(turns.is_empty());
    }
}
