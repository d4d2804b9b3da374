//! Rewrite collaborator backed by the Gemini `generateContent` REST API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{RewriteError, Rewriter, Tone};
use crate::config::Config;
use crate::util::preview;

/// Header carrying the API key, so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the generative language API.
#[derive(Clone)]
pub struct GeminiRewriter {
    client: Client,
    config: Config,
}

impl GeminiRewriter {
    /// Create a rewriter with a client honoring the configured timeout.
    pub fn new(config: Config) -> Result<Self, RewriteError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.rewrite_api_base, self.config.rewrite_model
        )
    }

    /// Send one `generateContent` request and return the response text.
    async fn generate(&self, request: &Value) -> Result<Option<String>, RewriteError> {
        let api_key = self.config.api_key.as_deref().ok_or(RewriteError::NotConfigured)?;

        let resp = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status_code = status.as_u16(),
                body_preview = preview(&body, 200),
                "rewrite_service_error_status"
            );
            return Err(RewriteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| RewriteError::Malformed(e.without_url().to_string()))?;

        Ok(parsed.text())
    }

    /// Suggest three subject lines for `body`.
    ///
    /// Any failure, including an unparseable reply, yields an empty list.
    pub async fn suggest_subjects(&self, body: &str) -> Vec<String> {
        info!(body_length = body.len(), "subject_suggest_starting");

        match self.generate(&subjects_request(body)).await {
            Ok(Some(text)) => {
                let subjects = parse_subjects(&text);
                info!(count = subjects.len(), "subject_suggest_complete");
                subjects
            }
            Ok(None) => {
                info!(count = 0, "subject_suggest_complete");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "subject_suggest_failed");
                Vec::new()
            }
        }
    }
}

impl Rewriter for GeminiRewriter {
    async fn rewrite(&self, text: &str, tone: Tone) -> Result<String, RewriteError> {
        info!(
            tone = %tone,
            text_length = text.len(),
            model = %self.config.rewrite_model,
            "rewrite_request_starting"
        );

        let request = rewrite_request(text, tone, self.config.rewrite_temperature);
        let rewritten = self.generate(&request).await?;

        // An empty reply leaves the text as it was.
        let result = rewritten
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| text.to_string());

        info!(
            tone = %tone,
            result_length = result.len(),
            "rewrite_request_complete"
        );

        Ok(result)
    }
}

// =============================================================================
// Request / Response shapes
// =============================================================================

fn rewrite_prompt(text: &str, tone: Tone) -> String {
    format!(
        "Rewrite the following email to a Member of Parliament (MP).\n\
         Use a {} tone.\n\
         Keep it persuasive and respectful, and make the call to action clear.\n\
         \n\
         Current content:\n\
         {}",
        tone, text
    )
}

fn rewrite_request(text: &str, tone: Tone, temperature: f64) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": rewrite_prompt(text, tone) }] }],
        "generationConfig": {
            "temperature": temperature,
            "thinkingConfig": { "thinkingBudget": 0 }
        }
    })
}

fn subjects_request(body: &str) -> Value {
    let prompt = format!(
        "Suggest 3 compelling, professional subject lines for an email to an MP \
         with the body below. Return a JSON array of strings.\n\
         \n\
         Email body:\n\
         {}",
        body
    );

    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}

/// Parse the JSON array of subject lines, or nothing.
fn parse_subjects(text: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(text) {
        Ok(subjects) => subjects,
        Err(e) => {
            warn!(
                error = %e,
                text_preview = preview(text, 200),
                "subject_suggest_parse_failed"
            );
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
