//! The external text-generation capability.

use crate::config::Configuration;
use async_trait::async_trait;
use gemini::Gemini;

/// Something that can turn a request into a generation response.
///
/// The configuration is passed per call; implementations must not cache
/// credentials between calls.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn generate_content(
        &self,
        config: &Configuration,
        request: gemini::Request,
    ) -> Result<gemini::Response, gemini::Error>;
}

/// Calls the hosted Gemini API.
#[derive(Debug, Clone, Default)]
pub struct GeminiBackend {
    base_url: Option<String>,
}

impl GeminiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send requests to a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    async fn generate_content(
        &self,
        config: &Configuration,
        request: gemini::Request,
    ) -> Result<gemini::Response, gemini::Error> {
        let mut client = Gemini::new(config.api_key.as_str())?.with_model(config.model_name.as_str());
        if let Some(base_url) = &self.base_url {
            client = client.with_base_url(base_url.as_str());
        }
        client.generate_content(&request).await
    }
}
