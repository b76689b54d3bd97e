//! Preview Projection — the baseline document with approved changes applied.

use tracing::warn;

use crate::models::resume::ResumeDocument;
use crate::workflow::engine::{ApprovedChanges, TailoredData};

/// Applies approved changes onto a clone of the baseline, in fixed
/// precedence: summary, then skills (full list replacement, not a merge),
/// then per-entry bullets.
///
/// Experience entries are matched by the (company, role) natural key the
/// tailoring tool recorded, since the baseline entry's own id is not
/// guaranteed to be known to the tool. An approved change with no matching
/// baseline entry — or no content to apply — is dropped with a warning,
/// never a hard failure.
pub fn project_preview(
    baseline: &ResumeDocument,
    tailored: &TailoredData,
    approved: &ApprovedChanges,
) -> ResumeDocument {
    let mut preview = baseline.clone();

    if let Some(approval) = approved.summary.as_ref().filter(|a| a.approved) {
        let text = approval
            .custom_text
            .clone()
            .or_else(|| tailored.summary.as_ref().map(|s| s.suggested.clone()));
        match text {
            Some(text) => preview.bio = text,
            None => warn!("approved summary has neither custom text nor a tailored suggestion"),
        }
    }

    if let Some(approval) = approved.skills.as_ref().filter(|a| a.approved) {
        let skills = approval
            .custom_skills
            .clone()
            .or_else(|| tailored.skills.clone());
        match skills {
            Some(skills) => preview.skills = skills,
            None => warn!("approved skills have neither custom list nor a tailored suggestion"),
        }
    }

    for (experience_id, approval) in &approved.experiences {
        if !approval.approved {
            continue;
        }
        let Some(suggestion) = tailored.experiences.get(experience_id) else {
            warn!("approval for experience {experience_id} has no tailored data; dropping");
            continue;
        };
        let bullets = approval
            .custom_bullets
            .clone()
            .unwrap_or_else(|| suggestion.suggested_bullets.clone());
        match preview
            .experiences
            .iter_mut()
            .find(|e| e.company == suggestion.company && e.role == suggestion.role)
        {
            Some(entry) => entry.bullets = bullets,
            None => warn!(
                "no baseline entry matches '{}' at '{}'; dropping tailored bullets",
                suggestion.role, suggestion.company
            ),
        }
    }

    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ExperienceEntry;
    use crate::workflow::tools::{
        ExperienceApproval, ExperienceSuggestion, SkillsApproval, SummaryApproval,
        SummarySuggestion,
    };

    fn baseline() -> ResumeDocument {
        ResumeDocument {
            bio: "Generalist engineer.".to_string(),
            skills: vec!["Python".to_string()],
            experiences: vec![ExperienceEntry {
                id: "exp_1".to_string(),
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                bullets: vec!["Did things.".to_string()],
            }],
        }
    }

    fn tailored_with_summary(suggested: &str) -> TailoredData {
        TailoredData {
            summary: Some(SummarySuggestion {
                suggested: suggested.to_string(),
                original: None,
            }),
            ..TailoredData::default()
        }
    }

    #[test]
    fn test_no_approvals_returns_baseline_unchanged() {
        let preview = project_preview(
            &baseline(),
            &TailoredData::default(),
            &ApprovedChanges::default(),
        );
        assert_eq!(preview, baseline());
    }

    #[test]
    fn test_approved_summary_falls_back_to_suggestion() {
        // Scenario: approved with customText null — suggestion wins.
        let approved = ApprovedChanges {
            summary: Some(SummaryApproval {
                approved: true,
                custom_text: None,
            }),
            ..ApprovedChanges::default()
        };
        let preview = project_preview(&baseline(), &tailored_with_summary("Y"), &approved);
        assert_eq!(preview.bio, "Y");
    }

    #[test]
    fn test_custom_text_beats_suggestion() {
        let approved = ApprovedChanges {
            summary: Some(SummaryApproval {
                approved: true,
                custom_text: Some("My own words".to_string()),
            }),
            ..ApprovedChanges::default()
        };
        let preview = project_preview(&baseline(), &tailored_with_summary("Y"), &approved);
        assert_eq!(preview.bio, "My own words");
    }

    #[test]
    fn test_rejected_summary_leaves_baseline() {
        let approved = ApprovedChanges {
            summary: Some(SummaryApproval {
                approved: false,
                custom_text: None,
            }),
            ..ApprovedChanges::default()
        };
        let preview = project_preview(&baseline(), &tailored_with_summary("Y"), &approved);
        assert_eq!(preview.bio, "Generalist engineer.");
    }

    #[test]
    fn test_orphaned_summary_approval_is_dropped() {
        // Approval exists but nothing was ever tailored and no custom text.
        let approved = ApprovedChanges {
            summary: Some(SummaryApproval {
                approved: true,
                custom_text: None,
            }),
            ..ApprovedChanges::default()
        };
        let preview = project_preview(&baseline(), &TailoredData::default(), &approved);
        assert_eq!(preview.bio, "Generalist engineer.", "orphaned approval is a no-op");
    }

    #[test]
    fn test_skills_are_replaced_not_merged() {
        let tailored = TailoredData {
            skills: Some(vec!["Rust".to_string(), "Postgres".to_string()]),
            ..TailoredData::default()
        };
        let approved = ApprovedChanges {
            skills: Some(SkillsApproval {
                approved: true,
                custom_skills: None,
            }),
            ..ApprovedChanges::default()
        };
        let preview = project_preview(&baseline(), &tailored, &approved);
        assert_eq!(
            preview.skills,
            vec!["Rust".to_string(), "Postgres".to_string()],
            "baseline skills must be fully replaced"
        );
    }

    #[test]
    fn test_experience_bullets_matched_by_company_and_role() {
        let mut tailored = TailoredData::default();
        tailored.experiences.insert(
            "42".to_string(),
            ExperienceSuggestion {
                experience_id: "42".to_string(),
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                suggested_bullets: vec!["Shipped the tailoring engine.".to_string()],
            },
        );
        let mut approved = ApprovedChanges::default();
        approved.experiences.insert(
            "42".to_string(),
            ExperienceApproval {
                experience_id: "42".to_string(),
                approved: true,
                custom_bullets: None,
            },
        );
        let preview = project_preview(&baseline(), &tailored, &approved);
        assert_eq!(
            preview.experiences[0].bullets,
            vec!["Shipped the tailoring engine.".to_string()]
        );
    }

    #[test]
    fn test_unmatched_experience_is_silently_skipped() {
        let mut tailored = TailoredData::default();
        tailored.experiences.insert(
            "42".to_string(),
            ExperienceSuggestion {
                experience_id: "42".to_string(),
                company: "Globex".to_string(), // not in baseline
                role: "Architect".to_string(),
                suggested_bullets: vec!["x".to_string()],
            },
        );
        let mut approved = ApprovedChanges::default();
        approved.experiences.insert(
            "42".to_string(),
            ExperienceApproval {
                experience_id: "42".to_string(),
                approved: true,
                custom_bullets: None,
            },
        );
        let preview = project_preview(&baseline(), &tailored, &approved);
        assert_eq!(preview, baseline(), "unmatched entry must not alter the preview");
    }

    #[test]
    fn test_custom_bullets_beat_suggested() {
        let mut tailored = TailoredData::default();
        tailored.experiences.insert(
            "42".to_string(),
            ExperienceSuggestion {
                experience_id: "42".to_string(),
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                suggested_bullets: vec!["suggested".to_string()],
            },
        );
        let mut approved = ApprovedChanges::default();
        approved.experiences.insert(
            "42".to_string(),
            ExperienceApproval {
                experience_id: "42".to_string(),
                approved: true,
                custom_bullets: Some(vec!["user edited".to_string()]),
            },
        );
        let preview = project_preview(&baseline(), &tailored, &approved);
        assert_eq!(preview.experiences[0].bullets, vec!["user edited".to_string()]);
    }
}
