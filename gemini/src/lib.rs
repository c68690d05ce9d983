//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for the `generateContent` endpoint with:
//! - Single-turn text prompts with an optional system instruction
//! - Sampling parameters (`generationConfig`) and safety thresholds
//! - Layered access to the generated text of a response

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an API error, if this error came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Gemini API client bound to one API key and model.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Set the model used for requests.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a `generateContent` request and return the parsed response.
    pub async fn generate_content(&self, request: &Request) -> Result<Response, Error> {
        let api_request = build_api_request(request);
        let headers = self.build_headers()?;

        debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;
        Response::from_json(value)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A single-turn generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub generation_config: Option<GenerationConfig>,
    pub safety_settings: Vec<SafetySetting>,
}

impl Request {
    /// Create a new request for the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            generation_config: None,
            safety_settings: Vec::new(),
        }
    }

    pub fn with_system_instruction(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(system.into());
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// One entry of the `safetySettings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }
}

/// Content categories the API can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Probability level at which content gets blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// A parsed `generateContent` response.
///
/// The original JSON body is kept so callers can fall back to it when the
/// response carries no text (for example when a prompt was blocked).
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub candidates: Vec<Candidate>,
    pub block_reason: Option<String>,
    pub usage: Option<Usage>,
    raw: serde_json::Value,
}

impl Response {
    /// Parse a response from its JSON body.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, Error> {
        let api: ApiResponse =
            serde_json::from_value(raw.clone()).map_err(|e| Error::Parse(e.to_string()))?;

        let candidates = api
            .candidates
            .into_iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .map(|content| content.parts.into_iter().map(Part::from).collect())
                    .unwrap_or_default(),
                finish_reason: c.finish_reason,
            })
            .collect();

        Ok(Self {
            candidates,
            block_reason: api.prompt_feedback.and_then(|f| f.block_reason),
            usage: api.usage_metadata.map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count.unwrap_or(0),
                total_tokens: u.total_token_count,
            }),
            raw,
        })
    }

    /// Build a single-candidate text response, the shape of a plain success.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        });
        Self {
            candidates: vec![Candidate {
                parts: vec![Part::Text(text)],
                finish_reason: Some("STOP".to_string()),
            }],
            block_reason: None,
            usage: None,
            raw,
        }
    }

    /// The response text, when it is unambiguous.
    ///
    /// Defined only for exactly one candidate whose parts are all text; the
    /// parts are concatenated. Blank text counts as no text.
    pub fn text(&self) -> Option<String> {
        let [candidate] = self.candidates.as_slice() else {
            return None;
        };
        if candidate.parts.is_empty() {
            return None;
        }
        candidate
            .parts
            .iter()
            .map(Part::as_text)
            .collect::<Option<Vec<_>>>()
            .map(|texts| texts.concat())
            .filter(|text| !text.trim().is_empty())
    }

    /// The first non-blank textual part found in any candidate.
    pub fn first_text_part(&self) -> Option<&str> {
        self.candidates
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(Part::as_text)
            .find(|text| !text.trim().is_empty())
    }

    /// The JSON body exactly as the API returned it.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// One generated alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: Option<String>,
}

/// A piece of candidate content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Non-text data (function calls, inline blobs) kept as raw JSON.
    Other(serde_json::Value),
}

impl Part {
    pub fn as_text(&self) -> Option<&str> {
        if let Part::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }
}

impl From<serde_json::Value> for Part {
    fn from(value: serde_json::Value) -> Self {
        match value.get("text").and_then(|t| t.as_str()) {
            Some(text) => Part::Text(text.to_string()),
            None => Part::Other(value),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ApiTextPart>,
}

#[derive(Debug, Serialize)]
struct ApiTextPart {
    text: String,
}

fn build_api_request(request: &Request) -> ApiRequest {
    ApiRequest {
        contents: vec![ApiContent {
            role: Some("user".to_string()),
            parts: vec![ApiTextPart {
                text: request.prompt.clone(),
            }],
        }],
        system_instruction: request.system_instruction.as_ref().map(|system| ApiContent {
            role: None,
            parts: vec![ApiTextPart {
                text: system.clone(),
            }],
        }),
        generation_config: request.generation_config,
        safety_settings: request.safety_settings.clone(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Pull a readable message out of an error body, falling back to the body itself.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { error }) => match error.status {
            Some(status) => format!("{status}: {}", error.message),
            None => error.message,
        },
        Err(_) => body.to_string(),
    }
}
