//! Record summarization through the Gemini `generateContent` API.
//!
//! [`SummarizerConfig::from_env`] returns `None` when `GEMINI_KEY` is unset;
//! the binary then wires in [`UnconfiguredSummarizer`], which answers every
//! call with [`NOT_CONFIGURED_SUMMARY`] so operators can tell a missing key
//! apart from a provider outage.

use std::time::Duration;

use arogya_core::error::{CoreError, CoreResult};
use arogya_core::ports::Summarizer;
use async_trait::async_trait;
use serde_json::{json, Value};

/// HTTP request timeout for a single summarization call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const TEMPERATURE: f64 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 300;

/// Returned when the provider answers successfully but with no text.
pub const EMPTY_SUMMARY: &str = "No summary returned.";

/// Summary text returned when no provider key is configured.
pub const NOT_CONFIGURED_SUMMARY: &str = "Gemini API key not configured.";

const PROMPT_PREAMBLE: &str = "You are a medical AI assistant. Summarize the following medical \
records in 2-3 lines and provide an AI analysis report:";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status; carries its error message if any.
    #[error("Summarizer returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
}

impl From<SummarizerError> for CoreError {
    fn from(err: SummarizerError) -> Self {
        CoreError::Unavailable(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// SummarizerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl SummarizerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable          | Required | Default                                     |
    /// |-------------------|----------|---------------------------------------------|
    /// | `GEMINI_KEY`      | yes      | -                                           |
    /// | `GEMINI_MODEL`    | no       | `gemini-1.5-flash`                          |
    /// | `GEMINI_BASE_URL` | no       | `https://generativelanguage.googleapis.com` |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_KEY").ok().filter(|k| !k.is_empty())?;
        Some(Self {
            api_key,
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
        })
    }

    /// `generateContent` endpoint for the configured model, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ---------------------------------------------------------------------------
// GeminiSummarizer
// ---------------------------------------------------------------------------

pub struct GeminiSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl GeminiSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self, SummarizerError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, text: &str) -> CoreResult<String> {
        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request_body(text))
            .send()
            .await
            .map_err(SummarizerError::from)?;

        let status = response.status();
        let body: Value = response.json().await.map_err(SummarizerError::from)?;
        if !status.is_success() {
            return Err(SummarizerError::HttpStatus {
                status: status.as_u16(),
                message: provider_error_message(&body),
            }
            .into());
        }

        tracing::debug!(model = %self.config.model, "Summary generated");
        Ok(extract_summary(&body))
    }
}

/// `generateContent` request payload for `text`.
fn request_body(text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": format!("{PROMPT_PREAMBLE}\n\n{text}") }] }],
        "generationConfig": {
            "temperature": TEMPERATURE,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
        },
    })
}

/// `candidates[0].content.parts[0].text`, or [`EMPTY_SUMMARY`].
fn extract_summary(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(EMPTY_SUMMARY)
        .to_string()
}

fn provider_error_message(body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}

// ---------------------------------------------------------------------------
// UnconfiguredSummarizer
// ---------------------------------------------------------------------------

/// Stand-in used when no provider key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredSummarizer;

#[async_trait]
impl Summarizer for UnconfiguredSummarizer {
    async fn summarize(&self, _text: &str) -> CoreResult<String> {
        tracing::warn!("Summary requested but GEMINI_KEY is not set");
        Ok(NOT_CONFIGURED_SUMMARY.to_string())
    }
}
