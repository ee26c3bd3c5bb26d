//! Rendering: converts validated HTML into a PDF through an external service.
//!
//! `Renderer` is the single capability; `PdfLayerRenderer` and
//! `SelectPdfRenderer` are the two implementations. Which one is primary and
//! which (if any) is the fallback is decided once at startup from config and
//! wired into a `RendererChain`.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::{Config, RendererKind};
use crate::errors::AppError;

pub mod chain;
pub mod pdflayer;
pub mod selectpdf;

pub use chain::RendererChain;
pub use pdflayer::PdfLayerRenderer;
pub use selectpdf::SelectPdfRenderer;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Upstream error bodies are clipped to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Markup and the PDF it was converted into. Transient: returned to the
/// caller, never stored.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub markup: String,
    pub binary: Bytes,
    pub media_type: String,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No HTML provided")]
    NoMarkup,

    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("{service} HTTP error: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API failed with status: {status}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} did not return a PDF (content type: {content_type})")]
    NotPdf {
        service: &'static str,
        content_type: String,
        body: String,
    },

    #[error("{service} returned an empty payload")]
    EmptyPayload { service: &'static str },

    #[error("{service} returned a payload without a PDF header")]
    NotPdfPayload { service: &'static str },

    #[error("all renderers failed: {}", describe_failures(.failures))]
    AllFailed { failures: Vec<RenderError> },
}

impl RenderError {
    fn from_reqwest(service: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            RenderError::Timeout { service }
        } else {
            RenderError::Http { service, source }
        }
    }

    /// Upstream-provided error text, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            RenderError::Status { body, .. } | RenderError::NotPdf { body, .. } => {
                Some(body.clone()).filter(|b| !b.is_empty())
            }
            RenderError::AllFailed { failures } => {
                let details: Vec<String> = failures.iter().filter_map(|f| f.details()).collect();
                (!details.is_empty()).then(|| details.join(" | "))
            }
            _ => None,
        }
    }
}

fn describe_failures(failures: &[RenderError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::RenderFailed {
            message: format!("Failed to generate PDF: {e}"),
            details: e.details(),
        }
    }
}

/// One markup string in, one PDF (or an explicit failure) out.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// `document_name` is a filename hint some services embed in the PDF.
    async fn render(&self, markup: &str, document_name: &str)
        -> Result<RenderedDocument, RenderError>;

    fn name(&self) -> &'static str;
}

/// Reads a conversion response: a non-success status carries the upstream
/// body, anything else goes through `verify_pdf_response`.
pub(crate) async fn read_pdf_response(
    service: &'static str,
    response: reqwest::Response,
) -> Result<Bytes, RenderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RenderError::Status {
            service,
            status: status.as_u16(),
            body: clip(&body),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|e| RenderError::from_reqwest(service, e))?;

    verify_pdf_response(service, content_type.as_deref(), body)
}

/// Checks a conversion response before anything trusts it as a PDF.
///
/// A wrong declared content type means the body is an error message, which is
/// attached to the error rather than returned as a document.
pub fn verify_pdf_response(
    service: &'static str,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<Bytes, RenderError> {
    let content_type = content_type.unwrap_or_default();
    if !content_type.to_ascii_lowercase().contains(PDF_MEDIA_TYPE) {
        return Err(RenderError::NotPdf {
            service,
            content_type: content_type.to_string(),
            body: clip(&String::from_utf8_lossy(&body)),
        });
    }
    ensure_pdf_payload(service, &body)?;
    Ok(body)
}

/// Rejects empty payloads and payloads without the `%PDF-` header.
pub fn ensure_pdf_payload(service: &'static str, body: &[u8]) -> Result<(), RenderError> {
    if body.is_empty() {
        return Err(RenderError::EmptyPayload { service });
    }
    if !body.starts_with(PDF_MAGIC) {
        return Err(RenderError::NotPdfPayload { service });
    }
    Ok(())
}

fn clip(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > MAX_ERROR_BODY_CHARS {
        text.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// Builds the renderer chain selected by config.
pub fn build_renderer_chain(config: &Config) -> Result<RendererChain> {
    let primary = build_renderer(config, config.primary_renderer)?;
    let fallback = config
        .fallback_renderer
        .map(|kind| build_renderer(config, kind))
        .transpose()?;
    Ok(RendererChain::new(primary, fallback))
}

fn build_renderer(config: &Config, kind: RendererKind) -> Result<Arc<dyn Renderer>> {
    let renderer: Arc<dyn Renderer> = match kind {
        RendererKind::PdfLayer => {
            let cfg = config
                .pdflayer
                .clone()
                .ok_or_else(|| anyhow!("pdflayer enabled without configuration"))?;
            Arc::new(PdfLayerRenderer::new(cfg)?)
        }
        RendererKind::SelectPdf => {
            let cfg = config
                .selectpdf
                .clone()
                .ok_or_else(|| anyhow!("selectpdf enabled without configuration"))?;
            Arc::new(SelectPdfRenderer::new(cfg)?)
        }
    };
    Ok(renderer)
}
