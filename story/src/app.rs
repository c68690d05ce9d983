//! Main application state and logic

use std::collections::VecDeque;

use story_core::{SessionError, StorySession};
use tracing::warn;

use ratatui::layout::Rect;

use crate::ui::theme::StoryTheme;
use crate::ui::widgets::wrapped_row_count;
use crate::ui::Overlay;

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - editing the story prompt
    Insert,
    /// Command mode - entering : commands
    Command,
}

/// The three output panes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Story,
    Feedback,
    Analysis,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Story, Pane::Feedback, Pane::Analysis];

    pub fn title(self) -> &'static str {
        match self {
            Pane::Story => "Generated Story",
            Pane::Feedback => "Editor Feedback",
            Pane::Analysis => "Reviewer Analysis",
        }
    }

    fn index(self) -> usize {
        match self {
            Pane::Story => 0,
            Pane::Feedback => 1,
            Pane::Analysis => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Pane::Story => Pane::Feedback,
            Pane::Feedback => Pane::Analysis,
            Pane::Analysis => Pane::Story,
        }
    }

    fn prev(self) -> Self {
        match self {
            Pane::Story => Pane::Analysis,
            Pane::Analysis => Pane::Feedback,
            Pane::Feedback => Pane::Story,
        }
    }
}

/// A generation the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GenerateStory(String),
    EditorFeedback,
    ReviewerAnalysis,
}

impl Action {
    /// Status line shown while the action runs
    pub fn progress_message(&self) -> &'static str {
        match self {
            Action::GenerateStory(_) => "Generating story...",
            Action::EditorFeedback => "Getting feedback from the editor...",
            Action::ReviewerAnalysis => "Getting analysis from the reviewer...",
        }
    }

    fn pane(&self) -> Pane {
        match self {
            Action::GenerateStory(_) => Pane::Story,
            Action::EditorFeedback => Pane::Feedback,
            Action::ReviewerAnalysis => Pane::Analysis,
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::GenerateStory(_) => "Failed to generate story",
            Action::EditorFeedback => "Failed to get editor feedback",
            Action::ReviewerAnalysis => "Failed to get reviewer analysis",
        }
    }
}

/// What a pane currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneContent {
    Empty,
    Text(String),
    Failure(String),
}

impl PaneContent {
    pub fn is_failure(&self) -> bool {
        matches!(self, PaneContent::Failure(_))
    }
}

/// Pane size assumed until the first layout is known
const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0,
    y: 0,
    width: 60,
    height: 10,
};

/// Main application state
pub struct App {
    pub session: StorySession,

    // UI state
    pub theme: StoryTheme,
    pub focused_pane: Pane,
    overlay: Option<Overlay>,

    // Output panes, indexed by `Pane`
    panes: [PaneContent; 3],
    scroll: [usize; 3],
    viewports: [Rect; 3], // Inner pane areas from the last layout

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    pub saved_input: Option<String>,
    prompt_stash: Option<String>, // Prompt hidden while a : command is typed

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Generation
    pending: Option<Action>,
    busy_pane: Option<Pane>,
}

impl App {
    pub fn new(session: StorySession) -> Self {
        let mut app = Self {
            session,
            theme: StoryTheme::default(),
            focused_pane: Pane::default(),
            overlay: None,
            panes: [PaneContent::Empty, PaneContent::Empty, PaneContent::Empty],
            scroll: [0; 3],
            viewports: [DEFAULT_VIEWPORT; 3],
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            input_history: VecDeque::with_capacity(100),
            history_index: None,
            saved_input: None,
            prompt_stash: None,
            status_message: None,
            should_quit: false,
            pending: None,
            busy_pane: None,
        };

        app.set_input("Write a short story about a dog who learns to fly.");
        app.set_status("Press 'i' to edit the prompt, Enter to generate, '?' for help");
        app
    }

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.prompt_stash = Some(std::mem::take(&mut self.input_buffer));
        self.input_mode = InputMode::Command;
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    /// Exit to normal mode
    pub fn enter_normal_mode(&mut self) {
        if self.input_mode == InputMode::Command {
            let prompt = self.prompt_stash.take().unwrap_or_default();
            self.set_input(prompt);
        }
        self.input_mode = InputMode::Normal;
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Queue a story generation for the current prompt
    pub fn request_story(&mut self) -> Option<Action> {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() {
            self.set_status("Enter a story prompt first");
            return None;
        }

        if self.input_history.front() != Some(&prompt) {
            self.input_history.push_front(prompt.clone());
            if self.input_history.len() > 100 {
                self.input_history.pop_back();
            }
        }
        self.history_index = None;
        Some(Action::GenerateStory(prompt))
    }

    /// Queue editor feedback, if there is a story to review
    pub fn request_feedback(&mut self) -> Option<Action> {
        self.require_story().then_some(Action::EditorFeedback)
    }

    /// Queue reviewer analysis, if there is a story to review
    pub fn request_analysis(&mut self) -> Option<Action> {
        self.require_story().then_some(Action::ReviewerAnalysis)
    }

    fn require_story(&mut self) -> bool {
        if self.session.has_story() {
            true
        } else {
            self.set_status("No story yet. Press 'i' and Enter to generate one.");
            false
        }
    }

    /// Schedule an action to run on the next loop iteration
    pub fn queue(&mut self, action: Action) {
        if self.busy_pane.is_some() || self.pending.is_some() {
            self.set_status("Still working, please wait...");
            return;
        }
        self.pending = Some(action);
    }

    pub fn take_pending(&mut self) -> Option<Action> {
        self.pending.take()
    }

    /// Mark an action as in flight so the next frame shows it
    pub fn start(&mut self, action: &Action) {
        self.set_status(action.progress_message());
        self.busy_pane = Some(action.pane());
    }

    /// The pane waiting on a generation, if any
    pub fn busy_pane(&self) -> Option<Pane> {
        self.busy_pane
    }

    /// Run an action to completion and show its result
    pub async fn run_action(&mut self, action: Action) {
        let result = match &action {
            Action::GenerateStory(prompt) => self.session.generate_story(prompt).await,
            Action::EditorFeedback => self.session.provide_feedback().await,
            Action::ReviewerAnalysis => self.session.provide_analysis().await,
        };
        self.busy_pane = None;
        self.show_result(&action, result);
    }

    fn show_result(&mut self, action: &Action, result: Result<String, SessionError>) {
        let pane = action.pane();
        match result {
            Ok(text) => {
                if let Action::GenerateStory(_) = action {
                    // A new story makes earlier feedback stale
                    self.panes[Pane::Feedback.index()] = PaneContent::Empty;
                    self.panes[Pane::Analysis.index()] = PaneContent::Empty;
                }
                self.set_pane(pane, PaneContent::Text(text));
                self.set_status(format!("{} ready", pane.title()));
            }
            Err(e) => {
                let message = format!("{}: {e}", action.failure_prefix());
                warn!(error = %e, "{}", action.failure_prefix());
                self.set_pane(pane, PaneContent::Failure(message.clone()));
                self.set_status(message);
            }
        }
        self.focused_pane = pane;
    }

    fn set_pane(&mut self, pane: Pane, content: PaneContent) {
        self.panes[pane.index()] = content;
        self.scroll[pane.index()] = 0;
    }

    pub fn pane(&self, pane: Pane) -> &PaneContent {
        &self.panes[pane.index()]
    }

    pub fn pane_scroll(&self, pane: Pane) -> usize {
        self.scroll[pane.index()]
    }

    /// Drop the story and every result
    pub fn clear_results(&mut self) {
        self.session.clear();
        self.panes = [PaneContent::Empty, PaneContent::Empty, PaneContent::Empty];
        self.scroll = [0; 3];
        self.set_status("Cleared");
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Record the pane areas of the current terminal size
    pub fn set_viewports(&mut self, viewports: [Rect; 3]) {
        self.viewports = viewports;
        for pane in Pane::ALL {
            let max = self.max_scroll(pane);
            let idx = pane.index();
            self.scroll[idx] = self.scroll[idx].min(max);
        }
    }

    /// Wrapped rows of a pane that do not fit in its viewport
    fn max_scroll(&self, pane: Pane) -> usize {
        let text = match self.pane(pane) {
            PaneContent::Empty => return 0,
            PaneContent::Text(text) | PaneContent::Failure(text) => text,
        };
        let viewport = self.viewports[pane.index()];
        wrapped_row_count(text, viewport.width).saturating_sub(viewport.height as usize)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let idx = self.focused_pane.index();
        self.scroll[idx] = self.scroll[idx].saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.max_scroll(self.focused_pane);
        let idx = self.focused_pane.index();
        self.scroll[idx] = self.scroll[idx].saturating_add(lines).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll[self.focused_pane.index()] = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        let max = self.max_scroll(self.focused_pane);
        self.scroll[self.focused_pane.index()] = max;
    }

    pub fn cycle_focus(&mut self) {
        self.focused_pane = self.focused_pane.next();
    }

    pub fn cycle_focus_reverse(&mut self) {
        self.focused_pane = self.focused_pane.prev();
    }

    // =========================================================================
    // Input editing
    // =========================================================================

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.remove_char_at_cursor();
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        self.remove_char_at_cursor();
    }

    fn remove_char_at_cursor(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Navigate to previous prompt in history
    pub fn history_prev(&mut self) {
        if self.input_history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.saved_input = Some(self.input_buffer.clone());
        }

        let idx = match self.history_index {
            None => 0,
            Some(i) if i + 1 < self.input_history.len() => i + 1,
            Some(i) => i,
        };

        if let Some(entry) = self.input_history.get(idx) {
            let entry = entry.clone();
            self.set_input(entry);
            self.history_index = Some(idx);
        }
    }

    /// Navigate to next prompt in history
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                let saved = self.saved_input.take().unwrap_or_default();
                self.set_input(saved);
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.input_history.get(i - 1) {
                    let entry = entry.clone();
                    self.set_input(entry);
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    // =========================================================================
    // Commands and overlays
    // =========================================================================

    /// Process a colon command, returning an action to run if any
    pub fn process_command(&mut self, command: &str) -> Option<Action> {
        let cmd = command.trim_start_matches(':').trim();

        match cmd {
            "q" | "quit" | "exit" => {
                self.should_quit = true;
                None
            }
            "help" | "h" => {
                self.toggle_help();
                None
            }
            "edit" | "e" => self.request_feedback(),
            "review" | "r" => self.request_analysis(),
            "clear" => {
                self.clear_results();
                None
            }
            "" => None,
            other => {
                self.set_status(format!("Unknown command: {other}"));
                None
            }
        }
    }

    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Set input buffer content and move cursor to end (unicode-safe)
    pub fn set_input(&mut self, content: impl Into<String>) {
        self.input_buffer = content.into();
        self.cursor_position = self.input_buffer.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
}
