//! Pending-Step Query — the ordered steps still actionable by the agent.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::plan::{Plan, Step, StepStatus};

/// Result of the pending-step query.
///
/// `completed_count` counts completed and skipped steps — both mean "no
/// longer blocking". `steps` excludes approval steps: those are surfaced via
/// `awaiting_user_input`, not as next actionable items, since the agent does
/// not self-approve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingSteps {
    pub steps: Vec<Step>,
    pub completed_count: usize,
    pub skipped_count: usize,
    pub pending_count: usize,
    pub total_count: usize,
}

/// Returns the plan steps not yet completed or skipped, in plan order, with
/// aggregate counts.
pub fn pending_steps(plan: &Plan, statuses: &HashMap<String, StepStatus>) -> PendingSteps {
    let total_count = plan.steps.len();
    let mut completed_count = 0usize;
    let mut skipped_count = 0usize;
    let mut steps = Vec::new();

    for step in &plan.steps {
        match statuses.get(&step.id).copied().unwrap_or(StepStatus::Pending) {
            StepStatus::Completed => completed_count += 1,
            StepStatus::Skipped => {
                completed_count += 1;
                skipped_count += 1;
            }
            StepStatus::Pending | StepStatus::InProgress => {
                if !step.step_type.is_approval() {
                    steps.push(step.clone());
                }
            }
        }
    }

    // Saturating: never negative even under transient inconsistency.
    let pending_count = total_count.saturating_sub(completed_count);

    PendingSteps {
        steps,
        completed_count,
        skipped_count,
        pending_count,
        total_count,
    }
}
