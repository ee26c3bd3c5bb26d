//! Rewrite Prompt Builder: deterministic text assembly, no I/O.

use crate::llm_client::prompts::{
    Prompt, FACTUAL_FIDELITY_INSTRUCTION, SELF_CONTAINED_HTML_INSTRUCTION,
};
use crate::rewrite::models::RewriteRequest;

const REWRITE_SYSTEM_PREAMBLE: &str = "You return valid, complete HTML documents \
    that are optimized for PDF generation.";

const REWRITE_SYSTEM_SUFFIX: &str = "Use semantic HTML5 elements where appropriate.";

const DOCUMENT_REQUIREMENTS: &str = "You are a CV writer, formatter and career consultant. \
Rewrite and structure the following CV into a HTML format.

Create a complete HTML document with the following requirements:
- Start with <!DOCTYPE html>
- Include <html lang=\"en\">, <head>, and <body> tags
- Add proper CSS styling within <style> tags in the head
- Make the design clean, professional, and print-friendly
- Use proper typography and spacing
- Group sections like Education, Experience, Skills, and Contact info clearly
- Format content with appropriate hierarchy and bullet points
- Ensure the layout works well for PDF conversion
- Use web-safe fonts and avoid external dependencies (no links, scripts, web fonts or remote images)

Return ONLY the complete HTML document, no code blocks or explanations.";

const REWRITE_INSTRUCTIONS: &str = "2. Reorganize and reword content to better highlight relevant experience
3. Incorporate missing keywords naturally, and only where they genuinely apply to the candidate's real experience
4. Strengthen weak areas identified in the analysis
5. Emphasize the strengths mentioned in the analysis
6. Use action verbs and quantifiable achievements where the original supports them
7. Tailor the language and focus to match the job role requirements
8. Ensure the CV flows well and maintains professional formatting
9. Keep the same general structure but optimize content presentation
10. Add missing skills only when they can reasonably be inferred from existing experience";

/// Builds the rewrite call from the original text, the role and every field
/// of the evaluation. Identical requests produce byte-identical prompts.
pub fn build_rewrite_prompt(request: &RewriteRequest) -> Prompt {
    let evaluation = &request.evaluation;

    let mut user = String::new();
    user.push_str(DOCUMENT_REQUIREMENTS);
    user.push_str("\n\n");

    user.push_str(&format!("Job Role: {}\n", request.role.trim()));
    if let Some(description) = request.role_description() {
        user.push_str(&format!("Job Description: {description}\n"));
    }

    user.push_str(&format!(
        "\nOriginal CV:\n{}\n\n",
        request.original_text.trim()
    ));

    user.push_str("Analysis Results:\n");
    user.push_str(&format!("- Overall Score: {}%\n", evaluation.overall_score));
    user.push_str(&format!(
        "- Match Percentage: {}%\n",
        evaluation.match_percentage
    ));
    user.push_str(&format!("- Strengths: {}\n", join_or_none(&evaluation.strengths, ", ")));
    user.push_str(&format!("- Weaknesses: {}\n", join_or_none(&evaluation.weaknesses, ", ")));
    user.push_str(&format!(
        "- Missing Skills: {}\n",
        join_or_none(&evaluation.missing_skills, ", ")
    ));
    user.push_str(&format!(
        "- Matched Keywords: {}\n",
        join_or_none(&evaluation.keyword_match.matched, ", ")
    ));
    user.push_str(&format!(
        "- Missing Keywords: {}\n",
        join_or_none(&evaluation.keyword_match.missing, ", ")
    ));
    user.push_str(&format!(
        "- Recommendations: {}\n",
        join_or_none(&evaluation.recommendations, "; ")
    ));
    user.push_str(&format!("- Summary: {}\n\n", evaluation.summary.trim()));

    user.push_str("Instructions for rewriting:\n");
    user.push_str(&format!("1. {FACTUAL_FIDELITY_INSTRUCTION}\n"));
    user.push_str(REWRITE_INSTRUCTIONS);

    Prompt {
        system: format!(
            "{REWRITE_SYSTEM_PREAMBLE} {SELF_CONTAINED_HTML_INSTRUCTION} {REWRITE_SYSTEM_SUFFIX}"
        ),
        user,
    }
}

fn join_or_none(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        "none identified".to_string()
    } else {
        items.join(separator)
    }
}
