//! Turn Log Store — ordered, append-only persistence for session turns.
//!
//! The only mutation operator is whole-turn replacement by id; there is no
//! partial fragment patch. Reads exclude zero-fragment turns, so a crashed
//! write that left a turn without fragments is invisible to derivation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::TailorError;
use crate::models::turn::Turn;

pub use memory::MemoryTurnStore;
pub use postgres::PgTurnStore;

#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Appends a new turn, or replaces an existing turn's fragment list
    /// wholesale if the id is already present. Replacement keeps the turn's
    /// original log position and is atomic: a concurrent reader sees either
    /// the old fragment set or the new one, never a partial mix.
    async fn append_or_replace_turn(
        &self,
        session_id: Uuid,
        turn: &Turn,
    ) -> Result<(), TailorError>;

    /// Returns the session's turns in log order, excluding turns with zero
    /// fragments.
    async fn read_turns(&self, session_id: Uuid) -> Result<Vec<Turn>, TailorError>;
}
