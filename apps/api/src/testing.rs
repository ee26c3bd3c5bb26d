//! Test doubles and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;

use crate::evaluation::models::{Evaluation, KeywordMatch};
use crate::llm_client::{Completion, CompletionError};
use crate::render::{RenderError, RenderedDocument, Renderer, PDF_MEDIA_TYPE};

pub const SAMPLE_EVALUATION_JSON: &str = r#"{
  "overallScore": 68,
  "matchPercentage": 61,
  "strengths": ["Five years of Java", "Spring Boot services", "Relational modelling"],
  "weaknesses": ["No cloud exposure", "Few metrics", "Thin testing story"],
  "missingSkills": ["Kubernetes", "Kafka", "AWS", "Observability"],
  "recommendations": ["Quantify impact", "Add a cloud project", "Mention CI/CD", "Lead with backend work"],
  "keywordMatch": {
    "matched": ["Java", "Spring", "SQL"],
    "missing": ["Kubernetes", "Microservices"]
  },
  "summary": "A capable Java developer with a solid Spring base. Cloud and messaging experience would close the gap."
}"#;

pub fn sample_evaluation() -> Evaluation {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Evaluation {
        overall_score: 68,
        match_percentage: 61,
        strengths: owned(&[
            "Five years of Java",
            "Spring Boot services",
            "Relational modelling",
        ]),
        weaknesses: owned(&["No cloud exposure", "Few metrics", "Thin testing story"]),
        missing_skills: owned(&["Kubernetes", "Kafka", "AWS", "Observability"]),
        recommendations: owned(&[
            "Quantify impact",
            "Add a cloud project",
            "Mention CI/CD",
            "Lead with backend work",
        ]),
        keyword_match: KeywordMatch {
            matched: owned(&["Java", "Spring", "SQL"]),
            missing: owned(&["Kubernetes", "Microservices"]),
        },
        summary: "A capable Java developer with a solid Spring base. \
            Cloud and messaging experience would close the gap."
            .to_string(),
    }
}

pub const VALID_HTML: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><style>body{font-family:Arial}</style></head>\n<body><h1>Jane Doe</h1></body>\n</html>";

pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_fake_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Completion stub returning a fixed reply (or failing) and recording prompts.
pub struct StubCompletion {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl StubCompletion {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for StubCompletion {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        self.reply.clone().ok_or(CompletionError::Api {
            status: 503,
            message: "stubbed outage".to_string(),
        })
    }
}

/// What a `StubRenderer` hands back on each call.
#[derive(Clone)]
pub enum StubOutcome {
    Pdf,
    /// A document that skipped verification, e.g. a misbehaving adapter.
    Raw { binary: Bytes, media_type: String },
    WrongContentType(String),
}

pub struct StubRenderer {
    name: &'static str,
    outcome: StubOutcome,
    calls: AtomicUsize,
}

impl StubRenderer {
    pub fn new(name: &'static str, outcome: StubOutcome) -> Self {
        Self {
            name,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(
        &self,
        markup: &str,
        _document_name: &str,
    ) -> Result<RenderedDocument, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StubOutcome::Pdf => Ok(RenderedDocument {
                markup: markup.to_string(),
                binary: Bytes::from_static(FAKE_PDF),
                media_type: PDF_MEDIA_TYPE.to_string(),
            }),
            StubOutcome::Raw { binary, media_type } => Ok(RenderedDocument {
                markup: markup.to_string(),
                binary: binary.clone(),
                media_type: media_type.clone(),
            }),
            StubOutcome::WrongContentType(content_type) => Err(RenderError::NotPdf {
                service: self.name,
                content_type: content_type.clone(),
                body: "quota exceeded".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
