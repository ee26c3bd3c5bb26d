use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::render::{ensure_pdf_payload, RenderError, RenderedDocument, Renderer, PDF_MEDIA_TYPE};

/// Primary renderer with an optional fallback, tried at most once each.
///
/// Every document leaving the chain is re-checked: a renderer that hands back
/// an empty or non-PDF document counts as failed.
pub struct RendererChain {
    primary: Arc<dyn Renderer>,
    fallback: Option<Arc<dyn Renderer>>,
}

impl RendererChain {
    pub fn new(primary: Arc<dyn Renderer>, fallback: Option<Arc<dyn Renderer>>) -> Self {
        Self { primary, fallback }
    }

    /// e.g. `pdflayer -> selectpdf`
    pub fn describe(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!("{} -> {}", self.primary.name(), fallback.name()),
            None => self.primary.name().to_string(),
        }
    }
}

async fn attempt(
    renderer: &dyn Renderer,
    markup: &str,
    document_name: &str,
) -> Result<RenderedDocument, RenderError> {
    let document = renderer.render(markup, document_name).await?;
    if document.media_type != PDF_MEDIA_TYPE {
        return Err(RenderError::NotPdf {
            service: renderer.name(),
            content_type: document.media_type,
            body: String::new(),
        });
    }
    ensure_pdf_payload(renderer.name(), &document.binary)?;
    Ok(document)
}

#[async_trait]
impl Renderer for RendererChain {
    async fn render(
        &self,
        markup: &str,
        document_name: &str,
    ) -> Result<RenderedDocument, RenderError> {
        let primary_err = match attempt(self.primary.as_ref(), markup, document_name).await {
            Ok(document) => return Ok(document),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        warn!(
            "Primary renderer {} failed ({primary_err}); falling back to {}",
            self.primary.name(),
            fallback.name()
        );

        match attempt(fallback.as_ref(), markup, document_name).await {
            Ok(document) => {
                info!(
                    "Fallback renderer {} produced {} bytes",
                    fallback.name(),
                    document.binary.len()
                );
                Ok(document)
            }
            Err(fallback_err) => Err(RenderError::AllFailed {
                failures: vec![primary_err, fallback_err],
            }),
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubOutcome, StubRenderer, VALID_HTML};
    use bytes::Bytes;

    fn chain(
        primary: &Arc<StubRenderer>,
        fallback: Option<&Arc<StubRenderer>>,
    ) -> RendererChain {
        RendererChain::new(
            primary.clone(),
            fallback.map(|f| f.clone() as Arc<dyn Renderer>),
        )
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(StubRenderer::new("pdflayer", StubOutcome::Pdf));
        let fallback = Arc::new(StubRenderer::new("selectpdf", StubOutcome::Pdf));

        let document = chain(&primary, Some(&fallback))
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap();

        assert_eq!(document.media_type, PDF_MEDIA_TYPE);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_content_type_falls_back_exactly_once() {
        let primary = Arc::new(StubRenderer::new(
            "pdflayer",
            StubOutcome::WrongContentType("text/plain".into()),
        ));
        let fallback = Arc::new(StubRenderer::new("selectpdf", StubOutcome::Pdf));

        let document = chain(&primary, Some(&fallback))
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap();

        assert!(!document.binary.is_empty());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_reports_both() {
        let primary = Arc::new(StubRenderer::new(
            "pdflayer",
            StubOutcome::WrongContentType("text/plain".into()),
        ));
        let fallback = Arc::new(StubRenderer::new(
            "selectpdf",
            StubOutcome::WrongContentType("text/html".into()),
        ));

        let err = chain(&primary, Some(&fallback))
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("pdflayer"));
        assert!(message.contains("selectpdf"));
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_fallback_returns_primary_error() {
        let primary = Arc::new(StubRenderer::new(
            "pdflayer",
            StubOutcome::WrongContentType("text/plain".into()),
        ));

        let err = chain(&primary, None)
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::NotPdf { .. }));
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_document_from_renderer_is_a_failure() {
        let primary = Arc::new(StubRenderer::new(
            "pdflayer",
            StubOutcome::Raw {
                binary: Bytes::new(),
                media_type: PDF_MEDIA_TYPE.to_string(),
            },
        ));

        let err = chain(&primary, None)
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::EmptyPayload { .. }));
    }

    #[tokio::test]
    async fn test_wrong_media_type_from_renderer_triggers_fallback() {
        let primary = Arc::new(StubRenderer::new(
            "pdflayer",
            StubOutcome::Raw {
                binary: Bytes::from_static(b"%PDF-1.4"),
                media_type: "text/plain".to_string(),
            },
        ));
        let fallback = Arc::new(StubRenderer::new("selectpdf", StubOutcome::Pdf));

        let document = chain(&primary, Some(&fallback))
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap();
        assert_eq!(document.media_type, PDF_MEDIA_TYPE);
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn test_describe_lists_chain() {
        let primary = Arc::new(StubRenderer::new("pdflayer", StubOutcome::Pdf));
        let fallback = Arc::new(StubRenderer::new("selectpdf", StubOutcome::Pdf));
        assert_eq!(
            chain(&primary, Some(&fallback)).describe(),
            "pdflayer -> selectpdf"
        );
        assert_eq!(chain(&primary, None).describe(), "pdflayer");
    }
}
