//! Baseline resume document — the projection target for approved changes.

use serde::{Deserialize, Serialize};

/// One experience entry in the baseline document.
///
/// `company` + `role` form the natural key used to match tailored bullets
/// back onto the baseline, since the tailoring tool is not guaranteed to know
/// the baseline entry's own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: String,
    pub company: String,
    pub role: String,
    pub bullets: Vec<String>,
}

/// The baseline document a tailoring session starts from. The preview
/// projection clones this and applies approved changes on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub bio: String,
    pub skills: Vec<String>,
    pub experiences: Vec<ExperienceEntry>,
}
