use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// The most flagged issues and fixes a single record may carry.
pub const MAXIMUM_LIST_LENGTH: usize = 5;

/// A criticism together with the actionable fix for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CritiquePair {
    #[serde(default, alias = "roast")]
    pub critique: String,
    #[serde(default, alias = "fix")]
    pub remedy: String,
}

impl CritiquePair {
    pub fn new<C: Into<String>, R: Into<String>>(critique: C, remedy: R) -> Self {
        CritiquePair {
            critique: critique.into(),
            remedy: remedy.into(),
        }
    }
}

/// The structured feedback produced for one uploaded resume.
///
/// The JSON representation is the one stored next to each roast, so both the
/// `critique`/`remedy` and the `roast`/`fix` spellings of the pairs are accepted.
/// Sections and lists which are missing from the JSON are treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FeedbackRecord {
    pub id: String,
    #[serde(default)]
    pub overall_score: Option<f64>,
    /// The score persisted alongside the record, used when `overall_score` is absent.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub one_liner: String,
    #[serde(default)]
    pub first_impression: CritiquePair,
    #[serde(default)]
    pub skills_section: CritiquePair,
    #[serde(default)]
    pub work_experience: CritiquePair,
    #[serde(default)]
    pub red_flags: Vec<CritiquePair>,
    #[serde(default)]
    pub top_fixes: Vec<String>,
}

/// A critique section as it appears in the report grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedSection<'a> {
    pub title: &'a str,
    pub pair: &'a CritiquePair,
}

impl FeedbackRecord {
    /// Parses a record from its JSON representation.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ContextError> {
        serde_json::from_slice(bytes)
            .map_err(|error| ContextError::with_error("Unable to parse the roast record", &error))
    }

    /// Checks the shape of the record before anything is rendered from it.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.id.trim().is_empty() {
            return Err(ContextError::with_context("Missing roast id"));
        }
        for (name, score) in [("overall_score", self.overall_score), ("score", self.score)] {
            if let Some(score) = score {
                if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                    return Err(ContextError::with_context(format!(
                        "The {} {} is not between 0 and 100",
                        name, score
                    )));
                }
            }
        }
        if self.red_flags.len() > MAXIMUM_LIST_LENGTH {
            return Err(ContextError::with_context(format!(
                "Found {} red flags, at most {} are allowed",
                self.red_flags.len(),
                MAXIMUM_LIST_LENGTH
            )));
        }
        if self.top_fixes.len() > MAXIMUM_LIST_LENGTH {
            return Err(ContextError::with_context(format!(
                "Found {} top fixes, at most {} are allowed",
                self.top_fixes.len(),
                MAXIMUM_LIST_LENGTH
            )));
        }

        Ok(())
    }

    /// The score shown on the report: the overall score, then the stored one, then zero.
    pub fn resolved_score(&self) -> f64 {
        self.overall_score.or(self.score).unwrap_or(0.0)
    }

    /// The three critique sections in the order in which they are laid out.
    pub fn sections(&self) -> [NamedSection<'_>; 3] {
        [
            NamedSection {
                title: "First impression",
                pair: &self.first_impression,
            },
            NamedSection {
                title: "Skills section",
                pair: &self.skills_section,
            },
            NamedSection {
                title: "Work experience",
                pair: &self.work_experience,
            },
        ]
    }
}

/// Formats a score the way it is printed on the report, whole numbers without decimals.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}
