//! Tool vocabulary — maps agent tool names to workflow steps and typed
//! payloads.
//!
//! The enum carries an explicit `Unrecognized` variant instead of a silent
//! fallthrough: a tool the engine does not know is a non-contributing
//! fragment, never an error, so newly introduced tools cannot block
//! derivation of the rest of the state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::plan::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    CreateTailoringPlan,
    CollectJobDetails,
    TailorSummary,
    ApproveSummary,
    TailorSkills,
    ApproveSkills,
    TailorExperienceEntry,
    ApproveExperienceEntry,
    SkipStep,
    FinalizeResume,
    Unrecognized(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "createTailoringPlan" => ToolKind::CreateTailoringPlan,
            "collectJobDetails" => ToolKind::CollectJobDetails,
            "tailorSummary" => ToolKind::TailorSummary,
            "approveSummary" => ToolKind::ApproveSummary,
            "tailorSkills" => ToolKind::TailorSkills,
            "approveSkills" => ToolKind::ApproveSkills,
            "tailorExperienceEntry" => ToolKind::TailorExperienceEntry,
            "approveExperienceEntry" => ToolKind::ApproveExperienceEntry,
            "skipStep" => ToolKind::SkipStep,
            "finalizeResume" => ToolKind::FinalizeResume,
            other => ToolKind::Unrecognized(other.to_string()),
        }
    }

    /// User-facing gating tools: the session blocks on user input while one
    /// of these sits in `approval-requested` or `input-available` state in
    /// the last agent turn.
    pub fn is_gating(&self) -> bool {
        matches!(
            self,
            ToolKind::CollectJobDetails
                | ToolKind::ApproveSummary
                | ToolKind::ApproveSkills
                | ToolKind::ApproveExperienceEntry
        )
    }

    /// Resolves the plan step id this tool contributes to. Static for the
    /// summary/skills/JD tools; dynamic for experience tools, keyed by the
    /// experience id from the output when present, else the input (the output
    /// is the source of truth once it exists).
    pub fn step_id(&self, input: Option<&Value>, output: Option<&Value>) -> Option<String> {
        match self {
            ToolKind::CollectJobDetails => Some("collect_jd".to_string()),
            ToolKind::TailorSummary => Some("tailor_summary".to_string()),
            ToolKind::ApproveSummary => Some("approve_summary".to_string()),
            ToolKind::TailorSkills => Some("tailor_skills".to_string()),
            ToolKind::ApproveSkills => Some("approve_skills".to_string()),
            ToolKind::FinalizeResume => Some("finalize".to_string()),
            ToolKind::TailorExperienceEntry => {
                experience_id(input, output).map(|id| format!("tailor_exp_{id}"))
            }
            ToolKind::ApproveExperienceEntry => {
                experience_id(input, output).map(|id| format!("approve_exp_{id}"))
            }
            ToolKind::CreateTailoringPlan | ToolKind::SkipStep | ToolKind::Unrecognized(_) => None,
        }
    }
}

fn experience_id(input: Option<&Value>, output: Option<&Value>) -> Option<String> {
    for payload in [output, input].into_iter().flatten() {
        if let Some(id) = payload.get("experienceId").and_then(Value::as_str) {
            return Some(id.to_string());
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Tool output payloads
// ────────────────────────────────────────────────────────────────────────────

/// Output of `createTailoringPlan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    pub steps: Vec<Step>,
}

/// Output of `tailorSummary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySuggestion {
    pub suggested: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// Output of `tailorSkills`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsSuggestion {
    pub suggested: Vec<String>,
}

/// Output of `tailorExperienceEntry`. `company`/`role` record the entry's
/// original natural key so the preview can match it back onto the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSuggestion {
    pub experience_id: String,
    pub company: String,
    pub role: String,
    pub suggested_bullets: Vec<String>,
}

/// Output of `approveSummary`. `custom_text` holds the user's edited text;
/// when absent, the generated suggestion is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryApproval {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
}

/// Output of `approveSkills`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsApproval {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_skills: Option<Vec<String>>,
}

/// Output of `approveExperienceEntry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceApproval {
    pub experience_id: String,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_bullets: Option<Vec<String>>,
}

/// Output of `skipStep`. `related_step_id` is the paired step the skip
/// cascades to; when absent the resolver computes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipOutput {
    pub step_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_step_id: Option<String>,
}
