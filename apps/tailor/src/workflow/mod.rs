//! Workflow state derivation.
//!
//! Everything here is a pure function over a turn-log snapshot: the engine
//! (`derive`), the skip-cascade resolver (`paired_step_id`), the pending-step
//! query (`pending_steps`), and the preview projection. Consumers re-run
//! `derive` whenever the log changes; nothing in this module holds state.

pub mod engine;
pub mod pending;
pub mod preview;
pub mod skip;
pub mod tools;

pub use engine::{derive, ApprovedChanges, DerivedState, TailoredData};
pub use pending::{pending_steps, PendingSteps};
pub use preview::project_preview;
pub use skip::paired_step_id;
pub use tools::ToolKind;
