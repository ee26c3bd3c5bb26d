//! Pipeline Orchestrator: sequences the evaluation and rewrite stages.
//!
//! Evaluate: Validating → Completing → Parsing
//! Rewrite:  Validating → Completing → ValidatingDocument → Rendering
//!
//! Each stage is a hard gate: the first failure ends the request with its
//! error kind and nothing partial is returned. No retries happen here; the
//! only local recovery is the renderer fallback inside `RendererChain`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::evaluation::models::{Evaluation, EvaluationRequest};
use crate::evaluation::parser::parse_evaluation;
use crate::evaluation::prompts::build_evaluation_prompt;
use crate::llm_client::Completion;
use crate::render::{RenderedDocument, Renderer};
use crate::rewrite::document::{clean_markup, is_valid_document, suggested_filename};
use crate::rewrite::models::RewriteRequest;
use crate::rewrite::prompts::build_rewrite_prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Completing,
    Parsing,
    ValidatingDocument,
    Rendering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Completing => "completing",
            Stage::Parsing => "parsing",
            Stage::ValidatingDocument => "validating_document",
            Stage::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

/// Result of a successful rewrite.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub document: RenderedDocument,
    pub filename: String,
}

/// Stateless across requests; safe to share behind an `Arc`.
pub struct Pipeline {
    completion: Arc<dyn Completion>,
    renderer: Arc<dyn Renderer>,
}

impl Pipeline {
    pub fn new(completion: Arc<dyn Completion>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            completion,
            renderer,
        }
    }

    /// Evaluates a résumé against a role.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<Evaluation, AppError> {
        request
            .validate()
            .map_err(|e| failed("evaluate", Stage::Validating, e))?;

        info!(
            "Evaluating CV ({} chars) for role '{}'",
            request.resume_text.len(),
            request.role.trim()
        );

        let prompt = build_evaluation_prompt(&request);
        let raw = self
            .completion
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(|e| failed("evaluate", Stage::Completing, e.into()))?;
        debug!("Evaluation completion returned {} chars", raw.len());

        let evaluation =
            parse_evaluation(&raw).map_err(|e| failed("evaluate", Stage::Parsing, e))?;

        info!(
            "Evaluation done: overall={} match={}",
            evaluation.overall_score, evaluation.match_percentage
        );
        Ok(evaluation)
    }

    /// Regenerates the résumé as HTML and renders it to PDF.
    pub async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteOutput, AppError> {
        let request = request
            .validate()
            .map_err(|e| failed("rewrite", Stage::Validating, e))?;

        info!(
            "Rewriting CV ({} chars) for role '{}'",
            request.original_text.len(),
            request.role.trim()
        );

        let prompt = build_rewrite_prompt(&request);
        let raw = self
            .completion
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(|e| failed("rewrite", Stage::Completing, e.into()))?;

        let markup = clean_markup(&raw);
        if !is_valid_document(&markup) {
            return Err(failed(
                "rewrite",
                Stage::ValidatingDocument,
                AppError::InvalidDocumentStructure(
                    "generated markup lacks a doctype or a language-tagged <html> root"
                        .to_string(),
                ),
            ));
        }
        debug!("Rewrite markup validated ({} chars)", markup.len());

        let filename = suggested_filename(&request.role);
        let document = self
            .renderer
            .render(&markup, &filename)
            .await
            .map_err(|e| failed("rewrite", Stage::Rendering, e.into()))?;

        info!(
            "Rewrite done: {} ({} chars of HTML -> {} bytes)",
            filename,
            document.markup.len(),
            document.binary.len()
        );
        Ok(RewriteOutput { document, filename })
    }
}

fn failed(operation: &str, stage: Stage, error: AppError) -> AppError {
    warn!("{operation} failed at stage {stage}: {}", error.code());
    error
}
