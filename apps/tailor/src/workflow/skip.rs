//! Skip-Cascade Resolver — skipping a generation step also skips its paired
//! approval step, and vice versa.

/// Returns the step id paired with `step_id`, or `None` when the step has no
/// pair (e.g. `collect_jd`, `finalize`).
///
/// Static pairs: `tailor_summary ↔ approve_summary`,
/// `tailor_skills ↔ approve_skills`. Dynamic per-entry pair:
/// `tailor_exp_<id> ↔ approve_exp_<id>` via prefix strip/prepend.
///
/// Skipping an id whose pair is not in the current plan is a no-op, not an
/// error — the engine only applies statuses to steps the plan actually
/// contains. Skipping is idempotent.
pub fn paired_step_id(step_id: &str) -> Option<String> {
    match step_id {
        "tailor_summary" => Some("approve_summary".to_string()),
        "approve_summary" => Some("tailor_summary".to_string()),
        "tailor_skills" => Some("approve_skills".to_string()),
        "approve_skills" => Some("tailor_skills".to_string()),
        other => {
            if let Some(id) = other.strip_prefix("tailor_exp_") {
                return Some(format!("approve_exp_{id}"));
            }
            if let Some(id) = other.strip_prefix("approve_exp_") {
                return Some(format!("tailor_exp_{id}"));
            }
            None
        }
    }
}
