//! Event handling for the story TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{Action, App, InputMode};

/// Result of handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    Run(Action),
}

impl From<Option<Action>> for EventResult {
    fn from(action: Option<Action>) -> Self {
        match action {
            Some(action) => EventResult::Run(action),
            None => EventResult::NeedsRedraw,
        }
    }
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    // Ctrl+C always quits
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (vim-style navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('i') => {
            app.input_mode = InputMode::Insert;
            EventResult::NeedsRedraw
        }
        KeyCode::Char('a') => {
            app.input_mode = InputMode::Insert;
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(':') => {
            app.enter_command_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,

        // Generation
        KeyCode::Enter => app.request_story().into(),
        KeyCode::Char('e') => app.request_feedback().into(),
        KeyCode::Char('r') => app.request_analysis().into(),

        // Navigation
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(5);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(5);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') => {
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
            EventResult::NeedsRedraw
        }
        KeyCode::Tab => {
            app.cycle_focus();
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab => {
            app.cycle_focus_reverse();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys in INSERT mode (editing the prompt)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.enter_normal_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            let action = app.request_story();
            if action.is_some() {
                app.enter_normal_mode();
            }
            action.into()
        }
        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.delete();
            EventResult::NeedsRedraw
        }
        KeyCode::Up => {
            app.history_prev();
            EventResult::NeedsRedraw
        }
        KeyCode::Down => {
            app.history_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys in COMMAND mode (: commands)
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.enter_normal_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            let command = app.input_buffer().to_string();
            app.enter_normal_mode();

            let action = app.process_command(&command);
            if app.should_quit {
                EventResult::Quit
            } else {
                action.into()
            }
        }
        KeyCode::Left => {
            if app.cursor_position() > 1 {
                app.cursor_left();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            if app.cursor_position() > 1 {
                app.backspace();
            } else {
                // Backspace on just ":" leaves command mode
                app.enter_normal_mode();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::{Configuration, GenerationClient, MockBackend, StaticConfig, StorySession};

    fn app() -> App {
        let client = GenerationClient::new(
            StaticConfig(Configuration::new("AIzaSyExample123", "gemini-2.0-flash")),
            MockBackend::default(),
        );
        App::new(StorySession::with_client(client))
    }

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_insert_and_submit() {
        let mut app = app();
        app.clear_input();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Insert);

        type_str(&mut app, "a lonely robot");
        let result = press(&mut app, KeyCode::Enter);

        assert_eq!(
            result,
            EventResult::Run(Action::GenerateStory("a lonely robot".to_string()))
        );
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_insert_keys_do_not_trigger_hotkeys() {
        let mut app = app();
        app.clear_input();
        press(&mut app, KeyCode::Char('i'));
        type_str(&mut app, "qer");
        assert_eq!(app.input_buffer(), "qer");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_editor_hotkey_without_story() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('e')), EventResult::NeedsRedraw);
        assert_eq!(press(&mut app, KeyCode::Char('r')), EventResult::NeedsRedraw);
    }

    #[test]
    fn test_colon_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char(':'));
        type_str(&mut app, "q");
        assert_eq!(press(&mut app, KeyCode::Enter), EventResult::Quit);
    }

    #[test]
    fn test_q_quits_in_normal_mode() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::Quit);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.has_overlay());
        assert_eq!(press(&mut app, KeyCode::Char('e')), EventResult::Continue);
        press(&mut app, KeyCode::Esc);
        assert!(!app.has_overlay());
    }

    #[test]
    fn test_backspace_on_colon_leaves_command_mode() {
        let mut app = app();
        let prompt = app.input_buffer().to_string();
        press(&mut app, KeyCode::Char(':'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.input_buffer(), prompt);
    }
}
