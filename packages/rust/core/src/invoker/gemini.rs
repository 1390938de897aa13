//! Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use docbrief_shared::{DocBriefError, GeminiConfig, InvocationError, Result};

use super::LlmInvoker;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Invoker backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiInvoker {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiInvoker")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiInvoker {
    /// Build an invoker for `model`. The key is used as-is; resolve it with
    /// [`docbrief_shared::validate_api_key`].
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, config: &GeminiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DocBriefError::config("Gemini API key is empty"));
        }

        let model = model.into();
        if model.trim().is_empty() {
            return Err(DocBriefError::config("Gemini model identifier is empty"));
        }

        let mut base = config.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| DocBriefError::config(format!("invalid Gemini endpoint for {model}: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("docbrief/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocBriefError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> std::result::Result<String, InvocationError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(InvocationError::new(match block_reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "response contained no candidates".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(InvocationError::new(match candidate.finish_reason {
                Some(reason) => format!("response contained no text (finish reason: {reason})"),
                None => "response contained no text".to_string(),
            }));
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

#[async_trait]
impl LlmInvoker for GeminiInvoker {
    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<String, InvocationError> {
        let start = Instant::now();
        let body = GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InvocationError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(model = %self.model, %status, "generateContent returned an error status");
            return Err(InvocationError::new(format!("{status}: {error_body}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InvocationError::new(e.to_string()))?;

        let text = parsed.into_text()?;

        info!(
            model = %self.model,
            completion_chars = text.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "generateContent complete"
        );

        Ok(text)
    }
}
