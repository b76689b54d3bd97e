//! Turn log domain model — turns, fragments, and the tool lifecycle.
//!
//! The turn log is the single source of truth for a tailoring session. Every
//! other piece of workflow state (plan, step statuses, approvals, preview) is
//! recomputed from it on demand.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "agent" => Some(Role::Agent),
            _ => None,
        }
    }
}

/// Tool execution lifecycle.
///
/// Transitions are monotonic within a single `tool_call_id`; the last-seen
/// state in log order is authoritative (a call id may reappear across turn
/// replacements during retries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    ApprovalRequested,
    ApprovalResponded,
    OutputAvailable,
    OutputError,
    OutputDenied,
}

impl ToolState {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolState::InputStreaming => "input-streaming",
            ToolState::InputAvailable => "input-available",
            ToolState::ApprovalRequested => "approval-requested",
            ToolState::ApprovalResponded => "approval-responded",
            ToolState::OutputAvailable => "output-available",
            ToolState::OutputError => "output-error",
            ToolState::OutputDenied => "output-denied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input-streaming" => Some(ToolState::InputStreaming),
            "input-available" => Some(ToolState::InputAvailable),
            "approval-requested" => Some(ToolState::ApprovalRequested),
            "approval-responded" => Some(ToolState::ApprovalResponded),
            "output-available" => Some(ToolState::OutputAvailable),
            "output-error" => Some(ToolState::OutputError),
            "output-denied" => Some(ToolState::OutputDenied),
            _ => None,
        }
    }
}

/// A tool invocation carried inside a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_call_id: String,
    pub tool_name: String,
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ToolCall {
    /// Checks the payload presence invariant: `output` is present iff the
    /// state is `output-available`, and `error_text` is present iff the state
    /// is `output-error` or `output-denied`.
    pub fn presence_invariant_holds(&self) -> bool {
        let output_ok = (self.state == ToolState::OutputAvailable) == self.output.is_some();
        let error_ok = matches!(self.state, ToolState::OutputError | ToolState::OutputDenied)
            == self.error_text.is_some();
        output_ok && error_ok
    }
}

/// An atomic content unit within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Fragment {
    Text {
        content: String,
    },
    Reasoning {
        content: String,
        #[serde(
            rename = "providerMetadata",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
    /// Structural boundary between agent reasoning/tool steps. No payload.
    StepMarker,
    ToolInvocation(ToolCall),
}

/// One participant utterance: an ordered list of fragments.
///
/// Turns are immutable except for whole-turn replacement by id (retry/edit
/// flow). A turn with zero fragments is invalid and is excluded from any log
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub fragments: Vec<Fragment>,
}

impl Turn {
    pub fn new(id: impl Into<String>, role: Role, fragments: Vec<Fragment>) -> Self {
        Self {
            id: id.into(),
            role,
            fragments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_state_round_trips_through_str() {
        let states = [
            ToolState::InputStreaming,
            ToolState::InputAvailable,
            ToolState::ApprovalRequested,
            ToolState::ApprovalResponded,
            ToolState::OutputAvailable,
            ToolState::OutputError,
            ToolState::OutputDenied,
        ];
        for state in states {
            assert_eq!(
                ToolState::parse(state.as_str()),
                Some(state),
                "as_str/parse must round-trip for {state:?}"
            );
        }
    }

    #[test]
    fn test_tool_state_serde_is_kebab_case() {
        let json = serde_json::to_value(ToolState::ApprovalRequested).unwrap();
        assert_eq!(json, json!("approval-requested"));
    }

    #[test]
    fn test_fragment_serde_uses_type_tag() {
        let fragment = Fragment::ToolInvocation(ToolCall {
            tool_call_id: "call_1".to_string(),
            tool_name: "tailorSummary".to_string(),
            state: ToolState::OutputAvailable,
            input: None,
            output: Some(json!({"suggested": "X"})),
            error_text: None,
        });
        let value = serde_json::to_value(&fragment).unwrap();
        assert_eq!(value["type"], "tool-invocation");
        assert_eq!(value["toolCallId"], "call_1");
        let back: Fragment = serde_json::from_value(value).unwrap();
        assert_eq!(back, fragment);
    }

    #[test]
    fn test_step_marker_serde() {
        let value = serde_json::to_value(Fragment::StepMarker).unwrap();
        assert_eq!(value["type"], "step-marker");
    }

    #[test]
    fn test_presence_invariant_output_available_requires_output() {
        let mut call = ToolCall {
            tool_call_id: "c".to_string(),
            tool_name: "tailorSummary".to_string(),
            state: ToolState::OutputAvailable,
            input: None,
            output: None,
            error_text: None,
        };
        assert!(!call.presence_invariant_holds(), "missing output must fail");
        call.output = Some(json!({}));
        assert!(call.presence_invariant_holds());
    }

    #[test]
    fn test_presence_invariant_error_states_require_error_text() {
        let call = ToolCall {
            tool_call_id: "c".to_string(),
            tool_name: "tailorSummary".to_string(),
            state: ToolState::OutputError,
            input: None,
            output: None,
            error_text: None,
        };
        assert!(!call.presence_invariant_holds(), "missing errorText must fail");
    }

    #[test]
    fn test_presence_invariant_pre_output_state_rejects_stray_output() {
        let call = ToolCall {
            tool_call_id: "c".to_string(),
            tool_name: "tailorSummary".to_string(),
            state: ToolState::InputAvailable,
            input: Some(json!({})),
            output: Some(json!({})),
            error_text: None,
        };
        assert!(!call.presence_invariant_holds());
    }
}
