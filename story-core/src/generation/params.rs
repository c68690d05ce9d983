//! Fixed sampling parameters and safety thresholds.

use gemini::{GenerationConfig, HarmBlockThreshold, HarmCategory, SafetySetting};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl GenerationParameters {
    /// Creative but coherent output of up to 2048 tokens.
    pub const STANDARD: Self = Self {
        temperature: 0.7,
        top_p: 0.95,
        top_k: 40,
        max_output_tokens: 2048,
    };

    pub fn to_generation_config(self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            max_output_tokens: Some(self.max_output_tokens),
        }
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Categories covered by the safety table.
pub const SAFETY_CATEGORIES: [HarmCategory; 4] = [
    HarmCategory::Harassment,
    HarmCategory::HateSpeech,
    HarmCategory::SexuallyExplicit,
    HarmCategory::DangerousContent,
];

/// Every category blocked only at high severity.
pub fn safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|&category| SafetySetting::new(category, HarmBlockThreshold::BlockOnlyHigh))
        .collect()
}

/// What to do with a response that carries no text at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFallback {
    /// Return the raw response body as the generated text.
    #[default]
    Stringify,
    /// Treat the response as a failed attempt and retry.
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_parameters() {
        let config = GenerationParameters::default().to_generation_config();
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.top_p, Some(0.95));
        assert_eq!(config.top_k, Some(40));
        assert_eq!(config.max_output_tokens, Some(2048));
    }

    #[test]
    fn test_safety_table() {
        let settings = safety_settings();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::BlockOnlyHigh));
        assert!(settings
            .iter()
            .any(|s| s.category == HarmCategory::DangerousContent));
    }
}
