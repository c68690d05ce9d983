//! Scrollable output pane for generated text

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use crate::app::PaneContent;
use crate::ui::theme::StoryTheme;

/// Rows `text` occupies once wrapped to `width` columns
pub fn wrapped_row_count(text: &str, width: u16) -> usize {
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .line_count(width)
}

/// One of the story, feedback or analysis panes
pub struct OutputWidget<'a> {
    title: &'a str,
    content: &'a PaneContent,
    theme: &'a StoryTheme,
    text_style: Style,
    placeholder: &'a str,
    scroll: usize,
    focused: bool,
    busy: bool,
}

impl<'a> OutputWidget<'a> {
    pub fn new(title: &'a str, content: &'a PaneContent, theme: &'a StoryTheme) -> Self {
        Self {
            title,
            content,
            theme,
            text_style: theme.story_style(),
            placeholder: "",
            scroll: 0,
            focused: false,
            busy: false,
        }
    }

    pub fn text_style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Mark the pane as waiting on a generation
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        if self.busy {
            return vec![Line::from(Span::styled("Working...", self.theme.hint_style()))];
        }

        let (text, style) = match self.content {
            PaneContent::Empty => {
                return vec![Line::from(Span::styled(
                    self.placeholder,
                    self.theme.hint_style(),
                ))]
            }
            PaneContent::Text(text) => (text, self.text_style),
            PaneContent::Failure(message) => (message, self.theme.error_style()),
        };

        text.lines()
            .map(|line| Line::from(Span::styled(line, style)))
            .collect()
    }
}

impl Widget for OutputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            format!(" {} [j/k scroll] ", self.title)
        } else {
            format!(" {} ", self.title)
        };

        let border_style = if self.content.is_failure() {
            self.theme.error_style()
        } else {
            self.theme.border_style(self.focused)
        };

        let block = Block::default()
            .title(Span::styled(title, self.theme.title_style(self.focused)))
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let paragraph = Paragraph::new(self.lines()).wrap(Wrap { trim: false });
        let visible_height = inner.height as usize;
        let total_lines = paragraph.line_count(inner.width);
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        paragraph
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(scrollbar_area, buf, &mut scrollbar_state);
        }
    }
}
