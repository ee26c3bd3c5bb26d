use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::info;

use crate::config::PdfLayerConfig;
use crate::render::{read_pdf_response, RenderError, RenderedDocument, Renderer, PDF_MEDIA_TYPE};

const SERVICE: &str = "pdflayer";
pub(crate) const CLIENT_USER_AGENT: &str = "CV-Rewriter/1.0";

/// pdflayer HTML-to-PDF API: form-encoded `document_html`, credentials in the
/// query string.
pub struct PdfLayerRenderer {
    client: Client,
    config: PdfLayerConfig,
}

impl PdfLayerRenderer {
    pub fn new(config: PdfLayerConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenderError::from_reqwest(SERVICE, e))?;
        Ok(Self { client, config })
    }

    fn query<'a>(&'a self, document_name: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![
            ("access_key", self.config.access_key.as_str()),
            ("document_name", document_name),
        ];
        if self.config.test_mode {
            query.push(("test", "1"));
        }
        query
    }
}

#[async_trait]
impl Renderer for PdfLayerRenderer {
    async fn render(
        &self,
        markup: &str,
        document_name: &str,
    ) -> Result<RenderedDocument, RenderError> {
        if markup.trim().is_empty() {
            return Err(RenderError::NoMarkup);
        }

        let response = self
            .client
            .post(&self.config.url)
            .query(&self.query(document_name))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .form(&[("document_html", markup)])
            .send()
            .await
            .map_err(|e| RenderError::from_reqwest(SERVICE, e))?;

        let binary = read_pdf_response(SERVICE, response).await?;
        info!("PDF generated successfully, size: {} bytes", binary.len());

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
