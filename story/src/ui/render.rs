//! Render orchestration for the story TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Pane};
use crate::ui::widgets::{InputWidget, OutputWidget};

/// Overlay types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
}

/// Screen regions
struct AppLayout {
    title_area: Rect,
    input_area: Rect,
    story_area: Rect,
    feedback_area: Rect,
    analysis_area: Rect,
    status_bar: Rect,
    hotkey_bar: Rect,
}

impl AppLayout {
    /// Story on the left, editor and reviewer stacked on the right
    fn calculate(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[2]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        Self {
            title_area: rows[0],
            input_area: rows[1],
            story_area: columns[0],
            feedback_area: side[0],
            analysis_area: side[1],
            status_bar: rows[3],
            hotkey_bar: rows[4],
        }
    }

    fn pane_area(&self, pane: Pane) -> Rect {
        match pane {
            Pane::Story => self.story_area,
            Pane::Feedback => self.feedback_area,
            Pane::Analysis => self.analysis_area,
        }
    }
}

/// Inner text area of each output pane, indexed like `Pane::ALL`
pub fn pane_viewports(area: Rect) -> [Rect; 3] {
    let layout = AppLayout::calculate(area);
    let block = Block::default().borders(Borders::ALL);
    Pane::ALL.map(|pane| block.inner(layout.pane_area(pane)))
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_title_bar(frame, layout.title_area);
    render_input(frame, app, layout.input_area);

    for pane in Pane::ALL {
        render_pane(frame, app, pane, layout.pane_area(pane));
    }

    render_status_bar(frame, app, layout.status_bar);
    render_hotkey_bar(frame, app, layout.hotkey_bar);

    if let Some(Overlay::Help) = app.overlay() {
        render_help_overlay(frame, app, area);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        " Multi-Agent Story Writer ",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_command = matches!(app.input_mode, InputMode::Command);
    let title = if is_command { " Command " } else { " Story Prompt " };

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .title(title)
        .active(matches!(app.input_mode, InputMode::Insert | InputMode::Command))
        .command_mode(is_command);

    frame.render_widget(input_widget, area);
}

fn render_pane(frame: &mut Frame, app: &App, pane: Pane, area: Rect) {
    let (style, placeholder) = match pane {
        Pane::Story => (
            app.theme.story_style(),
            "Press 'i' to edit the prompt, then Enter to write a story.",
        ),
        Pane::Feedback => (
            app.theme.feedback_style(),
            "Press 'e' for editor feedback once a story exists.",
        ),
        Pane::Analysis => (
            app.theme.analysis_style(),
            "Press 'r' for reviewer analysis once a story exists.",
        ),
    };

    let widget = OutputWidget::new(pane.title(), app.pane(pane), &app.theme)
        .text_style(style)
        .placeholder(placeholder)
        .scroll(app.pane_scroll(pane))
        .focused(app.focused_pane == pane)
        .busy(app.busy_pane() == Some(pane));

    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (mode, mode_color) = match app.input_mode {
        InputMode::Normal => ("NORMAL", Color::Blue),
        InputMode::Insert => ("INSERT", Color::Green),
        InputMode::Command => ("COMMAND", Color::Yellow),
    };

    let mut spans = vec![Span::styled(
        format!(" {mode} "),
        Style::default()
            .fg(Color::Black)
            .bg(mode_color)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(message) = app.status_message() {
        let style = if message.starts_with("Failed") {
            app.theme.error_style()
        } else {
            Style::default()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(message, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => {
            if app.session.has_story() {
                &[
                    ("i", "prompt"),
                    ("Enter", "write"),
                    ("e", "editor"),
                    ("r", "reviewer"),
                    ("Tab", "focus"),
                    ("?", "help"),
                    ("q", "quit"),
                ]
            } else {
                &[
                    ("i", "prompt"),
                    ("Enter", "write"),
                    ("Tab", "focus"),
                    ("?", "help"),
                    ("q", "quit"),
                ]
            }
        }
        InputMode::Insert => &[("Enter", "write story"), ("Esc", "normal mode")],
        InputMode::Command => &[("Enter", "run"), ("Esc", "cancel")],
    };

    let key_style = Style::default()
        .fg(app.theme.border_focused)
        .add_modifier(Modifier::BOLD);

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {key}"), key_style),
                Span::styled(format!(" {label} "), app.theme.hint_style()),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(56, 24, area);
    frame.render_widget(Clear, popup_area);

    let heading = Style::default().add_modifier(Modifier::UNDERLINED);
    let help_text = vec![
        Line::from(Span::styled(
            " Multi-Agent Story Writer - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Input Modes:", heading)),
        Line::from("  i       Edit the story prompt (INSERT mode)"),
        Line::from("  :       Enter COMMAND mode"),
        Line::from("  Esc     Return to NORMAL mode"),
        Line::from(""),
        Line::from(Span::styled("Agents:", heading)),
        Line::from("  Enter   Writer: generate a story from the prompt"),
        Line::from("  e       Editor: feedback on the current story"),
        Line::from("  r       Reviewer: analysis of the current story"),
        Line::from(""),
        Line::from(Span::styled("Navigation (NORMAL mode):", heading)),
        Line::from("  j/k or ↑/↓     Scroll the focused pane"),
        Line::from("  g/G            Jump to top/bottom"),
        Line::from("  Tab            Cycle pane focus"),
        Line::from(""),
        Line::from(Span::styled("Commands:", heading)),
        Line::from("  :q      Quit"),
        Line::from("  :edit   Editor feedback    :review  Reviewer analysis"),
        Line::from("  :clear  Discard the story and all results"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// A rectangle of at most `width` x `height`, centered in `area`
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
