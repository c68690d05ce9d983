//! Prompt input widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::StoryTheme;

/// Single prompt field; shows a cursor only while being edited
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a StoryTheme,
    title: &'a str,
    placeholder: &'a str,
    is_active: bool,
    is_command_mode: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            title: " Story Prompt ",
            placeholder: "Enter your story prompt...",
            is_active: false,
            is_command_mode: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn command_mode(mut self, is_command: bool) -> Self {
        self.is_command_mode = is_command;
        self
    }

    fn content_line(&self) -> Line<'a> {
        let prefix = if self.is_command_mode { ":" } else { "> " };

        if self.content.is_empty() && !self.is_command_mode {
            return Line::from(vec![
                Span::styled(prefix, self.theme.prompt_style()),
                Span::styled(self.placeholder, self.theme.hint_style()),
            ]);
        }

        let (text, cursor) = match self.content.strip_prefix(':') {
            Some(rest) if self.is_command_mode => (rest, self.cursor_position.saturating_sub(1)),
            _ => (self.content, self.cursor_position),
        };

        if !self.is_active {
            return Line::from(vec![
                Span::styled(prefix, self.theme.prompt_style()),
                Span::raw(text),
            ]);
        }

        // Character-based slicing for unicode safety
        let before: String = text.chars().take(cursor).collect();
        let at = text
            .chars()
            .nth(cursor)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after: String = text.chars().skip(cursor + 1).collect();

        Line::from(vec![
            Span::styled(prefix, self.theme.prompt_style()),
            Span::raw(before),
            Span::styled(
                at,
                Style::default()
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                    .fg(self.theme.prompt_text),
            ),
            Span::raw(after),
        ])
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.content_line())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(widget: InputWidget, width: u16) -> String {
        let area = Rect::new(0, 0, width, 3);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (0..width).map(|x| buf[(x, 1)].symbol().to_string()).collect()
    }

    #[test]
    fn test_placeholder_when_empty() {
        let theme = StoryTheme::default();
        let line = rendered(InputWidget::new("", &theme), 40);
        assert!(line.contains("Enter your story prompt"));
    }

    #[test]
    fn test_command_mode_hides_colon() {
        let theme = StoryTheme::default();
        let line = rendered(
            InputWidget::new(":quit", &theme).active(true).command_mode(true),
            20,
        );
        assert!(line.contains(":quit"));
        assert!(!line.contains("::"));
    }
}
