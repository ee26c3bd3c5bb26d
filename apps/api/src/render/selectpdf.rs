use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SelectPdfConfig;
use crate::render::pdflayer::CLIENT_USER_AGENT;
use crate::render::{read_pdf_response, RenderError, RenderedDocument, Renderer, PDF_MEDIA_TYPE};

const SERVICE: &str = "selectpdf";

/// Print-oriented page layout: A4 portrait, no margins, WebKit engine.
#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    key: &'a str,
    html: &'a str,
    page_size: &'static str,
    page_orientation: &'static str,
    margin_top: u32,
    margin_right: u32,
    margin_bottom: u32,
    margin_left: u32,
    engine: &'static str,
    page_numbers: bool,
    page_breaks_enhanced_algorithm: bool,
    css_media_type: &'static str,
}

impl<'a> ConvertRequest<'a> {
    fn print_layout(key: &'a str, html: &'a str) -> Self {
        Self {
            key,
            html,
            page_size: "A4",
            page_orientation: "Portrait",
            margin_top: 0,
            margin_right: 0,
            margin_bottom: 0,
            margin_left: 0,
            engine: "WebKit",
            page_numbers: false,
            page_breaks_enhanced_algorithm: true,
            css_media_type: "Print",
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    available: i64,
}

/// SelectPdf HTML-to-PDF API. After each successful conversion the remaining
/// monthly allowance is looked up in the background and logged.
pub struct SelectPdfRenderer {
    client: Client,
    config: SelectPdfConfig,
}

impl SelectPdfRenderer {
    pub fn new(config: SelectPdfConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenderError::from_reqwest(SERVICE, e))?;
        Ok(Self { client, config })
    }

    /// Detached usage lookup; its outcome never affects the render result.
    fn log_remaining_conversions(&self) {
        let client = self.client.clone();
        let url = self.config.usage_url.clone();
        let key = self.config.licence_key.clone();

        tokio::spawn(async move {
            let result = async {
                client
                    .get(&url)
                    .query(&[("key", key.as_str()), ("get_history", "False")])
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<UsageResponse>()
                    .await
            }
            .await;

            match result {
                Ok(usage) => info!("SelectPdf conversions remaining this month: {}", usage.available),
                Err(e) => warn!("Could not fetch SelectPdf usage: {e}"),
            }
        });
    }
}

#[async_trait]
impl Renderer for SelectPdfRenderer {
    async fn render(
        &self,
        markup: &str,
        _document_name: &str,
    ) -> Result<RenderedDocument, RenderError> {
        if markup.trim().is_empty() {
            return Err(RenderError::NoMarkup);
        }

        let response = self
            .client
            .post(&self.config.url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&ConvertRequest::print_layout(&self.config.licence_key, markup))
            .send()
            .await
            .map_err(|e| RenderError::from_reqwest(SERVICE, e))?;

        let binary = read_pdf_response(SERVICE, response).await?;
        info!("SelectPdf conversion succeeded, size: {} bytes", binary.len());

        self.log_remaining_conversions();

        Ok(RenderedDocument {
            markup: markup.to_string(),
            binary,
            media_type: PDF_MEDIA_TYPE.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_fake_service, FAKE_PDF, VALID_HTML};
    use axum::{
        http::{header, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn renderer(base: &str) -> SelectPdfRenderer {
        SelectPdfRenderer::new(SelectPdfConfig {
            licence_key: "sp-key".to_string(),
            url: format!("{base}/api2/convert/"),
            usage_url: format!("{base}/api2/usage/"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_print_layout_request_shape() {
        let value = serde_json::to_value(ConvertRequest::print_layout("k", "<html/>")).unwrap();
        assert_eq!(value["page_size"], "A4");
        assert_eq!(value["page_orientation"], "Portrait");
        assert_eq!(value["margin_left"], 0);
        assert_eq!(value["engine"], "WebKit");
        assert_eq!(value["page_numbers"], false);
        assert_eq!(value["css_media_type"], "Print");
    }

    #[tokio::test]
    async fn test_render_returns_pdf_and_checks_usage() {
        let usage_calls = Arc::new(AtomicUsize::new(0));
        let usage_counter = usage_calls.clone();

        let router = Router::new()
            .route(
                "/api2/convert/",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["key"], "sp-key");
                    assert!(body["html"].as_str().unwrap().contains("<html lang=\"en\">"));
                    ([(header::CONTENT_TYPE, "application/pdf")], FAKE_PDF)
                }),
            )
            .route(
                "/api2/usage/",
                get(move || {
                    usage_counter.fetch_add(1, Ordering::SeqCst);
                    async { Json(json!({"available": 194, "limit": 200})) }
                }),
            );
        let base = spawn_fake_service(router).await;

        let document = renderer(&base).render(VALID_HTML, "cv.pdf").await.unwrap();
        assert_eq!(&document.binary[..], FAKE_PDF);

        for _ in 0..50 {
            if usage_calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(usage_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_usage_failure_does_not_fail_render() {
        let router = Router::new()
            .route(
                "/api2/convert/",
                post(|| async { ([(header::CONTENT_TYPE, "application/pdf")], FAKE_PDF) }),
            )
            .route(
                "/api2/usage/",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let base = spawn_fake_service(router).await;

        assert!(renderer(&base).render(VALID_HTML, "cv.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_licence_error_is_render_error() {
        let router = Router::new().route(
            "/api2/convert/",
            post(|| async { (StatusCode::UNAUTHORIZED, "License key is not valid") }),
        );
        let base = spawn_fake_service(router).await;

        let err = renderer(&base)
            .render(VALID_HTML, "cv.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Status { status: 401, .. }));
        assert_eq!(err.details().as_deref(), Some("License key is not valid"));
    }
}
