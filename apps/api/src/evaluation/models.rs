use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Request body for a résumé evaluation.
///
/// Required fields default to empty so that a missing field surfaces as
/// `InvalidRequest` from validation rather than as an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default, alias = "jobRole")]
    pub role: String,
    #[serde(default, alias = "jobDescription")]
    pub role_description: Option<String>,
    #[serde(default, alias = "cvText")]
    pub resume_text: String,
}

impl EvaluationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.role.trim().is_empty() || self.resume_text.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Job role and CV text are required".to_string(),
            ));
        }
        Ok(())
    }

    /// The role description, if one was given and is not blank.
    pub fn role_description(&self) -> Option<&str> {
        non_blank(self.role_description.as_deref())
    }
}

/// Keywords from the target role found in, and missing from, the résumé.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Structured comparison between a résumé and a job role.
///
/// Only ever constructed through `parse_evaluation` or a validated rewrite
/// request, so both scores are within 0–100 and every list is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub overall_score: u32,
    pub match_percentage: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub keyword_match: KeywordMatch,
    pub summary: String,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
