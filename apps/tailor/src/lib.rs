//! Tailor — the chat engine behind a human-in-the-loop resume tailoring
//! workflow.
//!
//! A user and an agent take turns; the agent invokes discrete tools
//! (plan creation, per-section tailoring, approval gates, skips) whose
//! invocations are recorded as fragments in an append-only turn log. This
//! crate owns that log: the fragment codec and persistence
//! ([`store`]/[`codec`]), and the pure derivation pipeline ([`workflow`])
//! that reconstructs the current plan, per-step statuses, approved changes,
//! and a projected document preview from nothing but the log.
//!
//! The log is the single source of truth. Derivation is recomputed from
//! scratch on every call, which makes it idempotent and safe to re-run after
//! partial failures, retries, or reconnects.

pub mod codec;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod workflow;

pub use errors::TailorError;
pub use models::{
    ExperienceEntry, Fragment, Plan, ResumeDocument, Role, Step, StepContext, StepStatus,
    StepType, ToolCall, ToolState, Turn,
};
pub use store::{MemoryTurnStore, PgTurnStore, TurnStore};
pub use workflow::{
    derive, paired_step_id, pending_steps, ApprovedChanges, DerivedState, PendingSteps,
    TailoredData,
};
