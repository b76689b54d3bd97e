//! Fragment Codec — lossless mapping between in-memory fragments and the
//! flat persisted row shape.
//!
//! `decode(encode(f)) == f` for every fragment variant. The row shape is the
//! wire contract with storage and stays stable across tool-vocabulary
//! additions: new tools reuse the existing `tool-invocation` row type, so no
//! schema change is needed when the agent grows a new tool.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::errors::TailorError;
use crate::models::turn::{Fragment, ToolCall, ToolState};

/// Row type discriminators.
pub const ROW_TEXT: &str = "text";
pub const ROW_REASONING: &str = "reasoning";
pub const ROW_STEP_MARKER: &str = "step-marker";
pub const ROW_TOOL_INVOCATION: &str = "tool-invocation";

/// One persisted fragment row. Fields are populated or left NULL depending on
/// `row_type`; `ord` preserves fragment order within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FragmentRow {
    pub message_id: String,
    pub ord: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub row_type: String,
    pub text: Option<String>,
    pub reasoning: Option<String>,
    pub provider_metadata: Option<Value>,
    pub tool_call_id: Option<String>,
    pub tool_name: Option<String>,
    pub tool_state: Option<String>,
    pub tool_input: Option<Value>,
    pub tool_output: Option<Value>,
    pub tool_error: Option<String>,
}

impl FragmentRow {
    fn blank(message_id: &str, ord: i32, row_type: &str) -> Self {
        FragmentRow {
            message_id: message_id.to_string(),
            ord,
            row_type: row_type.to_string(),
            text: None,
            reasoning: None,
            provider_metadata: None,
            tool_call_id: None,
            tool_name: None,
            tool_state: None,
            tool_input: None,
            tool_output: None,
            tool_error: None,
        }
    }
}

/// Encodes a fragment into its persisted row. Total: every legal fragment has
/// a representation.
pub fn encode(fragment: &Fragment, message_id: &str, ord: i32) -> FragmentRow {
    match fragment {
        Fragment::Text { content } => {
            let mut row = FragmentRow::blank(message_id, ord, ROW_TEXT);
            row.text = Some(content.clone());
            row
        }
        Fragment::Reasoning {
            content,
            provider_metadata,
        } => {
            let mut row = FragmentRow::blank(message_id, ord, ROW_REASONING);
            row.reasoning = Some(content.clone());
            row.provider_metadata = provider_metadata.clone();
            row
        }
        Fragment::StepMarker => FragmentRow::blank(message_id, ord, ROW_STEP_MARKER),
        Fragment::ToolInvocation(call) => {
            let mut row = FragmentRow::blank(message_id, ord, ROW_TOOL_INVOCATION);
            row.tool_call_id = Some(call.tool_call_id.clone());
            row.tool_name = Some(call.tool_name.clone());
            row.tool_state = Some(call.state.as_str().to_string());
            row.tool_input = call.input.clone();
            row.tool_output = call.output.clone();
            row.tool_error = call.error_text.clone();
            row
        }
    }
}

/// Decodes a persisted row back into a fragment.
///
/// Fails loudly on unknown row types, unknown tool states, missing required
/// fields, or a violated output/error presence invariant. A row that cannot
/// be decoded means corrupted storage — silently dropping it would corrupt
/// every state derived downstream.
pub fn decode(row: &FragmentRow) -> Result<Fragment, TailorError> {
    match row.row_type.as_str() {
        ROW_TEXT => {
            let content = row.text.clone().ok_or_else(|| {
                TailorError::Codec(format!("text row {} has no text", row.message_id))
            })?;
            Ok(Fragment::Text { content })
        }
        ROW_REASONING => {
            let content = row.reasoning.clone().ok_or_else(|| {
                TailorError::Codec(format!("reasoning row {} has no reasoning", row.message_id))
            })?;
            Ok(Fragment::Reasoning {
                content,
                provider_metadata: row.provider_metadata.clone(),
            })
        }
        ROW_STEP_MARKER => Ok(Fragment::StepMarker),
        ROW_TOOL_INVOCATION => {
            let tool_call_id = required(&row.tool_call_id, row, "tool_call_id")?;
            let tool_name = required(&row.tool_name, row, "tool_name")?;
            let state_str = required(&row.tool_state, row, "tool_state")?;
            let state = ToolState::parse(&state_str).ok_or_else(|| {
                TailorError::Codec(format!(
                    "unknown tool state '{state_str}' in row {}/{}",
                    row.message_id, row.ord
                ))
            })?;
            let call = ToolCall {
                tool_call_id,
                tool_name,
                state,
                input: row.tool_input.clone(),
                output: row.tool_output.clone(),
                error_text: row.tool_error.clone(),
            };
            if !call.presence_invariant_holds() {
                return Err(TailorError::Codec(format!(
                    "tool invocation {} violates output/error presence invariant (state {})",
                    call.tool_call_id,
                    state.as_str()
                )));
            }
            Ok(Fragment::ToolInvocation(call))
        }
        other => Err(TailorError::Codec(format!(
            "unknown fragment row type '{other}' in row {}/{}",
            row.message_id, row.ord
        ))),
    }
}

fn required(
    field: &Option<String>,
    row: &FragmentRow,
    name: &str,
) -> Result<String, TailorError> {
    field.clone().ok_or_else(|| {
        TailorError::Codec(format!(
            "tool-invocation row {}/{} is missing {name}",
            row.message_id, row.ord
        ))
    })
}
