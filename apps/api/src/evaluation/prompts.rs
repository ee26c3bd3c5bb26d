//! Prompt assembly for the evaluation stage. Pure text, no I/O.

use crate::evaluation::models::EvaluationRequest;
use crate::llm_client::prompts::{Prompt, JSON_ONLY_INSTRUCTION};

const EVALUATION_ROLE: &str = "You are a professional CV analyst.";

const EVALUATION_SCHEMA: &str = r#"Provide a comprehensive analysis in the following JSON format:
{
  "overallScore": <integer 0-100>,
  "matchPercentage": <integer 0-100>,
  "strengths": [<array of 3-5 key strengths>],
  "weaknesses": [<array of 3-5 areas for improvement>],
  "missingSkills": [<array of 4-6 important missing skills>],
  "recommendations": [<array of 4-6 specific actionable recommendations>],
  "keywordMatch": {
    "matched": [<array of job-relevant keywords found in CV>],
    "missing": [<array of important keywords missing from CV>]
  },
  "summary": "<2-3 sentence executive summary of the analysis>"
}

Focus on:
1. Relevance to the specific job role
2. Skills alignment
3. Experience match
4. Keyword optimization
5. Areas for improvement
6. Specific, actionable recommendations

Be thorough, constructive, and provide valuable insights that will help improve the CV's effectiveness for this role."#;

/// Builds the evaluation call. Identical requests yield identical prompts.
pub fn build_evaluation_prompt(request: &EvaluationRequest) -> Prompt {
    let role_description = request.role_description();

    let mut user = format!(
        "You are an expert CV analyst and recruiter. Analyze the provided CV against the job role{}.\n\n",
        if role_description.is_some() {
            " and job description"
        } else {
            ""
        }
    );
    user.push_str(&format!("Job Role: {}\n", request.role.trim()));
    if let Some(description) = role_description {
        user.push_str(&format!("Job Description: {description}\n"));
    }
    user.push_str(&format!("\nCV Content:\n{}\n\n", request.resume_text.trim()));
    user.push_str(EVALUATION_SCHEMA);

    Prompt {
        system: format!("{EVALUATION_ROLE} {JSON_ONLY_INSTRUCTION}"),
        user,
    }
}
