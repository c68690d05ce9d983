//! Retrying generation client.
//!
//! [`GenerationClient::generate`] reloads the configuration, calls the
//! backend up to `max_retries` times and classifies each failure:
//! authentication failures stop immediately, rate limits back off linearly
//! (5s, 10s, 15s, ...) and everything else waits a fixed 2s.

mod backend;
mod classify;
mod params;

pub use backend::{GeminiBackend, TextBackend};
pub use classify::{BackoffPolicy, FailureClass};
pub use params::{safety_settings, GenerationParameters, RawFallback, SAFETY_CATEGORIES};

use crate::config::{ConfigError, ConfigProvider, Configuration, FileConfig};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Attempts made per request unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Shown when the API rejects the credentials.
pub const AUTH_FAILURE_MESSAGE: &str =
    "Error: The API key appears to be invalid. Please check your configuration.";

/// Shown when every attempt failed.
pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an error while processing your request. Please check your API key and model configuration.";

/// Terminal outcome of a failed generation.
///
/// `Display` yields the text shown to the user.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{}", AUTH_FAILURE_MESSAGE)]
    AuthenticationFailure { message: String },

    #[error("{}", APOLOGY_MESSAGE)]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl GenerationError {
    /// The underlying error text, for logs and detail views.
    pub fn detail(&self) -> String {
        match self {
            GenerationError::Config(err) => err.to_string(),
            GenerationError::AuthenticationFailure { message } => message.clone(),
            GenerationError::RetriesExhausted {
                attempts,
                last_error,
            } => format!("{attempts} attempt(s) failed; last error: {last_error}"),
        }
    }
}

/// Retrying wrapper around a [`TextBackend`].
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn ConfigProvider>,
    backend: Arc<dyn TextBackend>,
    max_retries: u32,
    parameters: GenerationParameters,
    backoff: BackoffPolicy,
    raw_fallback: RawFallback,
}

impl GenerationClient {
    /// Create a client from a configuration source and a backend.
    pub fn new(
        provider: impl ConfigProvider + 'static,
        backend: impl TextBackend + 'static,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            backend: Arc::new(backend),
            max_retries: DEFAULT_MAX_RETRIES,
            parameters: GenerationParameters::default(),
            backoff: BackoffPolicy::default(),
            raw_fallback: RawFallback::default(),
        }
    }

    /// Gemini client reading its configuration from a TOML file.
    pub fn gemini(config_path: impl Into<PathBuf>) -> Self {
        Self::new(FileConfig::new(config_path), GeminiBackend::new())
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_raw_fallback(mut self, raw_fallback: RawFallback) -> Self {
        self.raw_fallback = raw_fallback;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Load and validate the current configuration.
    pub fn configuration(&self) -> Result<Configuration, ConfigError> {
        let config = self.provider.load()?;
        config.validate()?;
        Ok(config)
    }

    /// Generate text for `prompt` with the client's retry budget.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_with_retries(prompt, self.max_retries).await
    }

    /// Generate text for `prompt`, making at most `max_retries` attempts.
    pub async fn generate_with_retries(
        &self,
        prompt: &str,
        max_retries: u32,
    ) -> Result<String, GenerationError> {
        let config = self.configuration().map_err(|err| {
            warn!(error = %err, "failed to load configuration");
            GenerationError::Config(err)
        })?;

        debug!(model = %config.model_name, prompt_chars = prompt.chars().count(), "generating text");

        let request = gemini::Request::new(prompt)
            .with_generation_config(self.parameters.to_generation_config())
            .with_safety_settings(safety_settings());

        let mut last_error = String::new();
        for attempt in 0..max_retries {
            let outcome = self
                .backend
                .generate_content(&config, request.clone())
                .await
                .and_then(|response| self.extract_text(response));

            let err = match outcome {
                Ok(text) => {
                    info!(attempt = attempt + 1, chars = text.len(), "generation succeeded");
                    return Ok(text);
                }
                Err(err) => err,
            };

            let message = err.to_string();
            warn!(
                attempt = attempt + 1,
                max_retries,
                error = %message,
                "error generating text with Gemini"
            );

            let class = FailureClass::of(&err);
            let Some(delay) = self.backoff.delay(class, attempt) else {
                return Err(GenerationError::AuthenticationFailure { message });
            };

            if class == FailureClass::RateLimited {
                warn!(wait_secs = delay.as_secs(), "rate limit hit, waiting before retry");
            } else {
                debug!(wait_secs = delay.as_secs(), "waiting before retry");
            }
            tokio::time::sleep(delay).await;
            last_error = message;
        }

        Err(GenerationError::RetriesExhausted {
            attempts: max_retries,
            last_error,
        })
    }

    /// Pull the text out of a response: direct text, then the first text
    /// part, then the raw body.
    fn extract_text(&self, response: gemini::Response) -> Result<String, gemini::Error> {
        if let Some(text) = response.text() {
            return Ok(text);
        }

        warn!(response = %response, "unexpected response format");
        if let Some(text) = response.first_text_part() {
            return Ok(text.to_string());
        }

        match self.raw_fallback {
            RawFallback::Stringify => {
                warn!("response carried no text, returning it verbatim");
                Ok(response.to_string())
            }
            RawFallback::Reject => Err(gemini::Error::Parse(match &response.block_reason {
                Some(reason) => format!("response contained no text (blocked: {reason})"),
                None => "response contained no text".to_string(),
            })),
        }
    }
}
