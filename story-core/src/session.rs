//! Story session: the current story and the actions that use it.

use crate::generation::{GenerationClient, GenerationError};
use crate::roles::StoryAgents;
use thiserror::Error;
use tracing::info;

/// Errors from session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("No story yet. Generate a story first.")]
    NoStory,
}

/// Holds the most recently generated story.
///
/// Only successful generations replace the story; a failure leaves the
/// previous one in place.
pub struct StorySession {
    agents: StoryAgents,
    story: Option<String>,
}

impl StorySession {
    pub fn new(agents: StoryAgents) -> Self {
        Self {
            agents,
            story: None,
        }
    }

    /// Session over a generation client with the standard roles.
    pub fn with_client(client: GenerationClient) -> Self {
        Self::new(StoryAgents::new(client))
    }

    /// Generate a story and make it the current one.
    pub async fn generate_story(&mut self, prompt: &str) -> Result<String, SessionError> {
        let story = self.agents.generate_story(prompt).await?;
        info!(chars = story.len(), "story stored");
        self.story = Some(story.clone());
        Ok(story)
    }

    /// Editor feedback on the current story.
    pub async fn provide_feedback(&self) -> Result<String, SessionError> {
        let story = self.story.as_deref().ok_or(SessionError::NoStory)?;
        Ok(self.agents.provide_feedback(story).await?)
    }

    /// Reviewer analysis of the current story.
    pub async fn provide_analysis(&self) -> Result<String, SessionError> {
        let story = self.story.as_deref().ok_or(SessionError::NoStory)?;
        Ok(self.agents.provide_analysis(story).await?)
    }

    pub fn story(&self) -> Option<&str> {
        self.story.as_deref()
    }

    pub fn has_story(&self) -> bool {
        self.story.is_some()
    }

    pub fn clear(&mut self) {
        self.story = None;
    }

    pub fn agents(&self) -> &StoryAgents {
        &self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, StaticConfig};
    use crate::testing::{MockBackend, MockReply};

    fn session(backend: &MockBackend) -> StorySession {
        StorySession::with_client(GenerationClient::new(
            StaticConfig(Configuration::new("AIzaSyExample123", "gemini-2.0-flash")),
            backend.clone(),
        ))
    }

    #[tokio::test]
    async fn test_feedback_without_story() {
        let backend = MockBackend::new(vec![]);
        let session = session(&backend);

        assert!(matches!(
            session.provide_feedback().await,
            Err(SessionError::NoStory)
        ));
        assert!(matches!(
            session.provide_analysis().await,
            Err(SessionError::NoStory)
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_feedback_uses_current_story() {
        let backend = MockBackend::new(vec![
            MockReply::text("The dog flew."),
            MockReply::text("Tighten the prose."),
        ]);
        let mut session = session(&backend);

        session.generate_story("a flying dog").await.unwrap();
        assert_eq!(session.story(), Some("The dog flew."));

        let feedback = session.provide_feedback().await.unwrap();
        assert_eq!(feedback, "Tighten the prose.");
        assert!(backend.prompts()[1].ends_with("Here is the text:\nThe dog flew."));
    }

    #[tokio::test]
    async fn test_clear() {
        let backend = MockBackend::new(vec![MockReply::text("A tale.")]);
        let mut session = session(&backend);

        session.generate_story("anything").await.unwrap();
        assert!(session.has_story());
        session.clear();
        assert!(!session.has_story());
    }

    #[test]
    fn test_generation_error_display_is_transparent() {
        let err = SessionError::from(GenerationError::AuthenticationFailure {
            message: "API key not valid".to_string(),
        });
        assert!(err.to_string().starts_with("Error: The API key"));
    }
}
