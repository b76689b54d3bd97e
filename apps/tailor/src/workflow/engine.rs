//! State Derivation Engine — folds the ordered turn log into the
//! authoritative workflow snapshot.
//!
//! The engine is a pure function over a log snapshot: no component holds
//! mutable derived state across calls, so it can be re-run after partial
//! failures or reconnects and always produces the same snapshot for the same
//! log. It never returns an error — malformed fragments, unknown tools, and
//! undeserializable payloads are logged and skipped so that one bad fragment
//! cannot block derivation of everything else.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::models::plan::{Plan, StepStatus};
use crate::models::resume::ResumeDocument;
use crate::models::turn::{Fragment, Role, ToolState, Turn};
use crate::workflow::pending::{pending_steps, PendingSteps};
use crate::workflow::preview::project_preview;
use crate::workflow::skip::paired_step_id;
use crate::workflow::tools::{
    ExperienceApproval, ExperienceSuggestion, PlanOutput, SkillsApproval, SkillsSuggestion,
    SkipOutput, SummaryApproval, SummarySuggestion, ToolKind,
};

// ────────────────────────────────────────────────────────────────────────────
// Derived state
// ────────────────────────────────────────────────────────────────────────────

/// Latest generated-but-not-yet-approved content per logical target,
/// extracted from tool outputs independent of approval status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TailoredData {
    pub summary: Option<SummarySuggestion>,
    pub skills: Option<Vec<String>>,
    /// Keyed by experience id from the tool output (source of truth).
    pub experiences: BTreeMap<String, ExperienceSuggestion>,
}

/// Latest approval outcome per logical target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApprovedChanges {
    pub summary: Option<SummaryApproval>,
    pub skills: Option<SkillsApproval>,
    pub experiences: BTreeMap<String, ExperienceApproval>,
}

/// The full workflow snapshot derived from one pass over the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedState {
    pub plan: Option<Plan>,
    pub step_statuses: HashMap<String, StepStatus>,
    pub tailored: TailoredData,
    pub approved: ApprovedChanges,
    pub preview: ResumeDocument,
    /// True iff the last turn is an agent turn holding a gating tool in
    /// `approval-requested` or `input-available` state. Computed from the
    /// last turn only — stale gates in earlier turns must not re-trigger.
    pub awaiting_user_input: bool,
    /// True iff the last turn is a user turn with no agent response yet
    /// (e.g. after a disconnect mid-generation). The caller decides whether
    /// to retry the agent loop.
    pub awaiting_agent_response: bool,
}

impl DerivedState {
    /// Pending-step query over the derived plan and statuses.
    pub fn pending(&self) -> Option<PendingSteps> {
        self.plan
            .as_ref()
            .map(|plan| pending_steps(plan, &self.step_statuses))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derivation
// ────────────────────────────────────────────────────────────────────────────

/// The authoritative view of one tool call after collapsing duplicates.
struct CallRecord {
    kind: ToolKind,
    state: ToolState,
    input: Option<Value>,
    output: Option<Value>,
    pos: usize,
}

/// Derives the full workflow snapshot from the ordered turn log.
///
/// `stored_plan` is a caller-supplied fallback for logs whose plan tool call
/// has been trimmed; a plan found in the log always overrides it.
pub fn derive(
    turns: &[Turn],
    stored_plan: Option<&Plan>,
    baseline: &ResumeDocument,
) -> DerivedState {
    // Pass 1: collapse the log into one authoritative record per tool call
    // id. Last write wins by log order (a call id may reappear across turn
    // replacements during retries) and the record takes the position of its
    // last sighting.
    let mut records: HashMap<String, CallRecord> = HashMap::new();
    let mut pos = 0usize;
    for turn in turns {
        for fragment in &turn.fragments {
            pos += 1;
            let Fragment::ToolInvocation(call) = fragment else {
                continue;
            };
            if !call.presence_invariant_holds() {
                warn!(
                    "skipping malformed tool invocation {} (state {})",
                    call.tool_call_id,
                    call.state.as_str()
                );
                continue;
            }
            records.insert(
                call.tool_call_id.clone(),
                CallRecord {
                    kind: ToolKind::from_name(&call.tool_name),
                    state: call.state,
                    input: call.input.clone(),
                    output: call.output.clone(),
                    pos,
                },
            );
        }
    }
    let mut ordered: Vec<&CallRecord> = records.values().collect();
    ordered.sort_by_key(|record| record.pos);

    // Pass 2: fold the collapsed records into the accumulator. Each plan
    // output starts a new epoch: step tracking resets so statuses are never
    // mixed across plan regenerations. Content accumulators are not
    // epoch-scoped — the latest suggestion/approval per target stands.
    let mut plan: Option<Plan> = None;
    let mut completed: HashSet<String> = HashSet::new();
    let mut attempted: HashSet<String> = HashSet::new();
    let mut skipped: HashSet<String> = HashSet::new();
    let mut tailored = TailoredData::default();
    let mut approved = ApprovedChanges::default();

    for record in ordered {
        match &record.kind {
            ToolKind::CreateTailoringPlan => {
                let Some(output) = &record.output else { continue };
                match serde_json::from_value::<PlanOutput>(output.clone()) {
                    Ok(parsed) => {
                        plan = Some(Plan {
                            steps: parsed.steps,
                        });
                        completed.clear();
                        attempted.clear();
                        skipped.clear();
                    }
                    Err(e) => warn!("unparseable createTailoringPlan output: {e}"),
                }
            }
            ToolKind::SkipStep => {
                let Some(output) = &record.output else { continue };
                match serde_json::from_value::<SkipOutput>(output.clone()) {
                    Ok(skip) => {
                        let pair = skip
                            .related_step_id
                            .clone()
                            .or_else(|| paired_step_id(&skip.step_id));
                        skipped.insert(skip.step_id);
                        if let Some(pair) = pair {
                            skipped.insert(pair);
                        }
                    }
                    Err(e) => warn!("unparseable skipStep output: {e}"),
                }
            }
            ToolKind::Unrecognized(name) => {
                warn!("ignoring unrecognized tool '{name}'");
            }
            kind => {
                if let Some(output) = &record.output {
                    upsert_content(kind, output, &mut tailored, &mut approved);
                }
                if let Some(step_id) = kind.step_id(record.input.as_ref(), record.output.as_ref())
                {
                    if record.state == ToolState::OutputAvailable {
                        completed.insert(step_id);
                    } else {
                        // Pre-output, errored, and denied calls all leave the
                        // step attempted-but-not-done; the caller retries or
                        // skips.
                        attempted.insert(step_id);
                    }
                }
            }
        }
    }

    let plan = plan.or_else(|| stored_plan.cloned());

    let step_statuses: HashMap<String, StepStatus> = plan
        .as_ref()
        .map(|plan| {
            plan.steps
                .iter()
                .map(|step| {
                    // Skip is a terminal user decision, so it wins over a
                    // completion observed for the same id.
                    let status = if skipped.contains(&step.id) {
                        StepStatus::Skipped
                    } else if completed.contains(&step.id) {
                        StepStatus::Completed
                    } else if attempted.contains(&step.id) {
                        StepStatus::InProgress
                    } else {
                        StepStatus::Pending
                    };
                    (step.id.clone(), status)
                })
                .collect()
        })
        .unwrap_or_default();

    let awaiting_user_input = turns.last().is_some_and(|turn| {
        turn.role == Role::Agent
            && turn.fragments.iter().any(|fragment| match fragment {
                Fragment::ToolInvocation(call) => {
                    ToolKind::from_name(&call.tool_name).is_gating()
                        && matches!(
                            call.state,
                            ToolState::ApprovalRequested | ToolState::InputAvailable
                        )
                }
                _ => false,
            })
    });
    let awaiting_agent_response = turns.last().is_some_and(|turn| turn.role == Role::User);

    let preview = project_preview(baseline, &tailored, &approved);

    DerivedState {
        plan,
        step_statuses,
        tailored,
        approved,
        preview,
        awaiting_user_input,
        awaiting_agent_response,
    }
}

fn upsert_content(
    kind: &ToolKind,
    output: &Value,
    tailored: &mut TailoredData,
    approved: &mut ApprovedChanges,
) {
    match kind {
        ToolKind::TailorSummary => {
            parse_output(output, "tailorSummary", |suggestion: SummarySuggestion| {
                tailored.summary = Some(suggestion);
            });
        }
        ToolKind::TailorSkills => {
            parse_output(output, "tailorSkills", |suggestion: SkillsSuggestion| {
                tailored.skills = Some(suggestion.suggested);
            });
        }
        ToolKind::TailorExperienceEntry => {
            parse_output(
                output,
                "tailorExperienceEntry",
                |suggestion: ExperienceSuggestion| {
                    tailored
                        .experiences
                        .insert(suggestion.experience_id.clone(), suggestion);
                },
            );
        }
        ToolKind::ApproveSummary => {
            parse_output(output, "approveSummary", |approval: SummaryApproval| {
                approved.summary = Some(approval);
            });
        }
        ToolKind::ApproveSkills => {
            parse_output(output, "approveSkills", |approval: SkillsApproval| {
                approved.skills = Some(approval);
            });
        }
        ToolKind::ApproveExperienceEntry => {
            parse_output(
                output,
                "approveExperienceEntry",
                |approval: ExperienceApproval| {
                    approved
                        .experiences
                        .insert(approval.experience_id.clone(), approval);
                },
            );
        }
        // Completion-only tools carry no content for the accumulators.
        ToolKind::CollectJobDetails | ToolKind::FinalizeResume => {}
        ToolKind::CreateTailoringPlan | ToolKind::SkipStep | ToolKind::Unrecognized(_) => {}
    }
}

fn parse_output<T: DeserializeOwned>(output: &Value, tool: &str, apply: impl FnOnce(T)) {
    match serde_json::from_value::<T>(output.clone()) {
        Ok(value) => apply(value),
        Err(e) => warn!("unparseable {tool} output: {e}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
