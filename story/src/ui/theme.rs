//! Color theme and styling for the story TUI

use ratatui::style::{Color, Modifier, Style};

/// UI color theme
#[derive(Debug, Clone)]
pub struct StoryTheme {
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub prompt_text: Color,
    pub story_text: Color,
    pub feedback_text: Color,
    pub analysis_text: Color,
    pub error_text: Color,
    pub hint_text: Color,
}

impl Default for StoryTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            prompt_text: Color::Cyan,
            story_text: Color::White,
            feedback_text: Color::LightYellow,
            analysis_text: Color::LightMagenta,
            error_text: Color::LightRed,
            hint_text: Color::DarkGray,
        }
    }
}

impl StoryTheme {
    /// Style for the prompt being edited
    pub fn prompt_style(&self) -> Style {
        Style::default()
            .fg(self.prompt_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    pub fn feedback_style(&self) -> Style {
        Style::default().fg(self.feedback_text)
    }

    pub fn analysis_style(&self) -> Style {
        Style::default().fg(self.analysis_text)
    }

    /// Style for failed generations and error status
    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for placeholders and hints
    pub fn hint_style(&self) -> Style {
        Style::default()
            .fg(self.hint_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
