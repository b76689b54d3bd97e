//! Tailoring plan model — the ordered steps the workflow passes through.
//!
//! A plan is produced once by a `createTailoringPlan` tool invocation and is
//! immutable reference data thereafter. If the agent regenerates the plan, the
//! most recent one by log order wins and statuses derived from the old plan
//! are discarded (see `workflow::engine`).

use serde::{Deserialize, Serialize};

/// Logical stage kinds. Experience steps are parameterized by an experience
/// id and are one step per entry, not a single global step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    CollectJd,
    TailorSummary,
    ApproveSummary,
    TailorSkills,
    ApproveSkills,
    TailorExperience,
    ApproveExperience,
    Finalize,
}

impl StepType {
    /// Approval gates require user sign-off; the agent never self-approves,
    /// so they are excluded from "next actionable" listings.
    pub fn is_approval(self) -> bool {
        matches!(
            self,
            StepType::ApproveSummary | StepType::ApproveSkills | StepType::ApproveExperience
        )
    }
}

/// Contextual parameters attached to a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_id: Option<String>,
}

/// One plan step with a stable id (e.g. `tailor_summary`, `tailor_exp_42`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<StepContext>,
}

/// The full ordered plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

/// Derived status of a step. Computed on every derivation pass, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}
