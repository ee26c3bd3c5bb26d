use serde::Deserialize;

use crate::errors::AppError;
use crate::evaluation::models::{non_blank, Evaluation};
use crate::evaluation::parser::validate_evaluation;

/// Wire shape of a rewrite request. Every field is optional here so that an
/// absent field is reported as `InvalidRequest` by `RewriteRequest::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteBody {
    #[serde(default, alias = "originalCV")]
    pub original_text: Option<String>,
    #[serde(default, alias = "jobRole")]
    pub role: Option<String>,
    #[serde(default, alias = "jobDescription")]
    pub role_description: Option<String>,
    #[serde(default, alias = "analysis")]
    pub evaluation: Option<Evaluation>,
}

/// A rewrite cannot be requested without a prior evaluation.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub original_text: String,
    pub role: String,
    pub role_description: Option<String>,
    pub evaluation: Evaluation,
}

impl RewriteRequest {
    /// Checks that both texts are non-blank and that the supplied evaluation
    /// satisfies the same rules as a freshly parsed one.
    pub fn validate(self) -> Result<Self, AppError> {
        if self.original_text.trim().is_empty() || self.role.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Original CV, job role, and analysis are required".to_string(),
            ));
        }
        let evaluation = validate_evaluation(self.evaluation)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid analysis: {e}")))?;
        Ok(Self { evaluation, ..self })
    }

    pub fn role_description(&self) -> Option<&str> {
        non_blank(self.role_description.as_deref())
    }
}

impl TryFrom<RewriteBody> for RewriteRequest {
    type Error = AppError;

    fn try_from(body: RewriteBody) -> Result<Self, Self::Error> {
        match (body.original_text, body.role, body.evaluation) {
            (Some(original_text), Some(role), Some(evaluation)) => Ok(RewriteRequest {
                original_text,
                role,
                role_description: body.role_description,
                evaluation,
            }),
            _ => Err(AppError::InvalidRequest(
                "Original CV, job role, and analysis are required".to_string(),
            )),
        }
    }
}
