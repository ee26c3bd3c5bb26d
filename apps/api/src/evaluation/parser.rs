//! Evaluation Parser: turns raw model output into a validated `Evaluation`.
//!
//! The model is told to return bare JSON, but nothing enforces that at the
//! protocol level. Fences and stray prose are stripped, then every field is
//! checked. Nothing is defaulted: a missing or out-of-range field is
//! `MalformedEvaluation`.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::warn;

use crate::errors::AppError;
use crate::evaluation::models::Evaluation;
use crate::llm_client::strip_code_fences;

const MAX_SCORE: u32 = 100;

const STRENGTHS_LEN: RangeInclusive<usize> = 3..=5;
const WEAKNESSES_LEN: RangeInclusive<usize> = 3..=5;
const MISSING_SKILLS_LEN: RangeInclusive<usize> = 4..=6;
const RECOMMENDATIONS_LEN: RangeInclusive<usize> = 4..=6;

/// Parses and validates raw completion text into an `Evaluation`.
pub fn parse_evaluation(raw: &str) -> Result<Evaluation, AppError> {
    let text = extract_json_object(strip_code_fences(raw));

    let evaluation: Evaluation = serde_json::from_str(text)
        .map_err(|e| AppError::MalformedEvaluation(format!("Unparseable evaluation: {e}")))?;

    validate_evaluation(evaluation).map_err(AppError::MalformedEvaluation)
}

/// Checks the invariants serde cannot express and normalises keyword sets.
///
/// Returns a description of the first violated rule. List lengths outside the
/// prompt's guidance are logged but accepted.
pub fn validate_evaluation(mut evaluation: Evaluation) -> Result<Evaluation, String> {
    if evaluation.overall_score > MAX_SCORE {
        return Err(format!(
            "overallScore {} is outside 0-{MAX_SCORE}",
            evaluation.overall_score
        ));
    }
    if evaluation.match_percentage > MAX_SCORE {
        return Err(format!(
            "matchPercentage {} is outside 0-{MAX_SCORE}",
            evaluation.match_percentage
        ));
    }
    if evaluation.summary.trim().is_empty() {
        return Err("summary is empty".to_string());
    }

    for (field, len, expected) in [
        ("strengths", evaluation.strengths.len(), STRENGTHS_LEN),
        ("weaknesses", evaluation.weaknesses.len(), WEAKNESSES_LEN),
        ("missingSkills", evaluation.missing_skills.len(), MISSING_SKILLS_LEN),
        (
            "recommendations",
            evaluation.recommendations.len(),
            RECOMMENDATIONS_LEN,
        ),
    ] {
        if !expected.contains(&len) {
            warn!(
                "Evaluation field {field} has {len} items (expected {}-{})",
                expected.start(),
                expected.end()
            );
        }
    }

    dedup_in_place(&mut evaluation.keyword_match.matched);
    dedup_in_place(&mut evaluation.keyword_match.missing);

    Ok(evaluation)
}

/// Returns the outermost `{ ... }` span, dropping stray prose on either side.
fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Removes repeated entries, keeping the first occurrence.
fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
