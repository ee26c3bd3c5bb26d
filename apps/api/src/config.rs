use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_PDFLAYER_URL: &str = "http://api.pdflayer.com/api/convert";
const DEFAULT_SELECTPDF_URL: &str = "https://selectpdf.com/api2/convert/";
const DEFAULT_SELECTPDF_USAGE_URL: &str = "https://selectpdf.com/api2/usage/";
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;

/// Which external HTML-to-PDF service a renderer slot points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    PdfLayer,
    SelectPdf,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::PdfLayer => f.write_str("pdflayer"),
            RendererKind::SelectPdf => f.write_str("selectpdf"),
        }
    }
}

impl FromStr for RendererKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdflayer" => Ok(RendererKind::PdfLayer),
            "selectpdf" => Ok(RendererKind::SelectPdf),
            other => bail!("Unknown renderer '{other}' (expected 'pdflayer' or 'selectpdf')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PdfLayerConfig {
    pub access_key: String,
    pub url: String,
    /// Sandbox conversions (watermarked, not billed).
    pub test_mode: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SelectPdfConfig {
    pub licence_key: String,
    pub url: String,
    pub usage_url: String,
    pub timeout: Duration,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing, including the key of any
/// renderer enabled as primary or fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub primary_renderer: RendererKind,
    pub fallback_renderer: Option<RendererKind>,
    pub pdflayer: Option<PdfLayerConfig>,
    pub selectpdf: Option<SelectPdfConfig>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source so the rules can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let completion_timeout = Duration::from_secs(parse_or(
            &lookup,
            "COMPLETION_TIMEOUT_SECS",
            DEFAULT_COMPLETION_TIMEOUT_SECS,
        )?);
        let render_timeout = Duration::from_secs(parse_or(
            &lookup,
            "RENDER_TIMEOUT_SECS",
            DEFAULT_RENDER_TIMEOUT_SECS,
        )?);

        let openai = OpenAiConfig {
            api_key: require(&lookup, "OPENAI_API_KEY")?,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            timeout: completion_timeout,
        };

        let primary_renderer: RendererKind = lookup("PRIMARY_RENDERER")
            .unwrap_or_else(|| "pdflayer".to_string())
            .parse()
            .context("PRIMARY_RENDERER is invalid")?;

        let fallback_renderer = match lookup("FALLBACK_RENDERER")
            .unwrap_or_else(|| "selectpdf".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "none" => None,
            other => Some(
                other
                    .parse::<RendererKind>()
                    .context("FALLBACK_RENDERER is invalid")?,
            ),
        };

        if fallback_renderer == Some(primary_renderer) {
            bail!("FALLBACK_RENDERER must differ from PRIMARY_RENDERER ({primary_renderer})");
        }

        let enabled = |kind| primary_renderer == kind || fallback_renderer == Some(kind);

        let pdflayer = if enabled(RendererKind::PdfLayer) {
            Some(PdfLayerConfig {
                access_key: require(&lookup, "PDFLAYER_KEY")?,
                url: lookup("PDFLAYER_URL").unwrap_or_else(|| DEFAULT_PDFLAYER_URL.to_string()),
                test_mode: parse_or(&lookup, "PDFLAYER_TEST_MODE", false)?,
                timeout: render_timeout,
            })
        } else {
            None
        };

        let selectpdf = if enabled(RendererKind::SelectPdf) {
            Some(SelectPdfConfig {
                licence_key: require(&lookup, "SELECTPDF_LICENCE_KEY")?,
                url: lookup("SELECTPDF_URL").unwrap_or_else(|| DEFAULT_SELECTPDF_URL.to_string()),
                usage_url: lookup("SELECTPDF_USAGE_URL")
                    .unwrap_or_else(|| DEFAULT_SELECTPDF_USAGE_URL.to_string()),
                timeout: render_timeout,
            })
        } else {
            None
        };

        Ok(Config {
            openai,
            primary_renderer,
            fallback_renderer,
            pdflayer,
            selectpdf,
            port: parse_or(&lookup, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
