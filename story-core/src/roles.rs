//! Writer, editor and reviewer roles.
//!
//! A role is a fixed instruction template wrapped around caller input. All
//! roles share one generation path; they differ only in their template.

use crate::generation::{GenerationClient, GenerationError};
use tracing::debug;

/// Placeholder replaced with the caller's input in a template.
const INPUT_PLACEHOLDER: &str = "{input}";

const WRITER_TEMPLATE: &str = "Write a creative short story based on this prompt: {input}";

const EDITOR_TEMPLATE: &str = "Please provide detailed editorial feedback on the following text, focusing on:
1. Grammar and punctuation
2. Clarity and readability
3. Style and tone
4. Suggestions for improvement

Here is the text:
{input}";

const REVIEWER_TEMPLATE: &str = "Please provide a thoughtful literary analysis of the following story, focusing on:
1. Main themes and motifs
2. Character development
3. Narrative structure
4. Overall impact and emotional resonance
5. Literary merit

Here is the story:
{input}";

/// A named instruction template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub instruction_template: String,
    /// Describes the role to users. Not sent to the API.
    pub default_system_message: String,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        instruction_template: impl Into<String>,
        default_system_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instruction_template: instruction_template.into(),
            default_system_message: default_system_message.into(),
        }
    }

    pub fn writer() -> Self {
        Self::new(
            "Writer",
            WRITER_TEMPLATE,
            "You are a creative writer. Please respond in professional and creative style.",
        )
    }

    pub fn editor() -> Self {
        Self::new(
            "Editor",
            EDITOR_TEMPLATE,
            "You are a professional editor. You give feedback on content. Focus on grammar, clarity, and style.",
        )
    }

    pub fn reviewer() -> Self {
        Self::new(
            "Reviewer",
            REVIEWER_TEMPLATE,
            "You are a literary reviewer who analyzes themes, character development, and overall impact.",
        )
    }

    /// Substitute `input` for the template's placeholder.
    pub fn render(&self, input: &str) -> String {
        self.instruction_template
            .replacen(INPUT_PLACEHOLDER, input, 1)
    }
}

/// The three roles bound to one generation client.
#[derive(Clone)]
pub struct StoryAgents {
    client: GenerationClient,
    writer: Role,
    editor: Role,
    reviewer: Role,
}

impl StoryAgents {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            writer: Role::writer(),
            editor: Role::editor(),
            reviewer: Role::reviewer(),
        }
    }

    /// Render `role`'s template around `input` and generate.
    pub async fn invoke(&self, role: &Role, input: &str) -> Result<String, GenerationError> {
        self.client.generate(&role.render(input)).await
    }

    /// Write a short story from a user prompt.
    pub async fn generate_story(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(prompt = %preview(prompt, 50), "writer generating story");
        self.invoke(&self.writer, prompt).await
    }

    /// Editorial feedback on a piece of text.
    pub async fn provide_feedback(&self, text: &str) -> Result<String, GenerationError> {
        debug!(text_len = text.len(), "editor providing feedback");
        self.invoke(&self.editor, text).await
    }

    /// Literary analysis of a story.
    pub async fn provide_analysis(&self, text: &str) -> Result<String, GenerationError> {
        debug!(text_len = text.len(), "reviewer providing analysis");
        self.invoke(&self.reviewer, text).await
    }

    pub fn writer(&self) -> &Role {
        &self.writer
    }

    pub fn editor(&self) -> &Role {
        &self.editor
    }

    pub fn reviewer(&self) -> &Role {
        &self.reviewer
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }
}

/// The first `max` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
