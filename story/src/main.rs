//! Story writer TUI application.
//!
//! A vim-style terminal interface for writing short stories with an AI
//! writer, then getting feedback from an AI editor and reviewer.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface on stdin/stdout:
//!
//! ```bash
//! cargo run -p story -- --headless --config config/config.toml
//! ```

mod app;
mod events;
mod headless;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;
use story_core::{
    ConfigError, FileConfig, GenerationClient, StorySession, DEFAULT_CONFIG_PATH,
    DEFAULT_MAX_RETRIES, SAMPLE_CONFIG,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use events::{handle_event, EventResult};
use ui::render::{pane_viewports, render};

const DEFAULT_LOG_FILTER: &str = "story=info,story_core=info,gemini=warn";
const LOG_FILE: &str = "story.log";

/// Multi-agent story writer
#[derive(Parser, Debug)]
#[command(name = "story")]
#[command(about = "Write short stories with an AI writer, editor and reviewer")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "STORY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Attempts per generation request
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Run in headless mode (line protocol on stdin/stdout, no TUI)
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.headless);

    let provider = FileConfig::new(&cli.config);
    if let Err(e) = check_configuration(&provider) {
        eprintln!("Configuration Error: {e}");
        eprintln!(
            "Please update your {} file with valid API key and model name.",
            cli.config.display()
        );
        eprintln!();
        eprintln!("{SAMPLE_CONFIG}");
        std::process::exit(1);
    }

    let client = GenerationClient::gemini(&cli.config).with_max_retries(cli.max_retries);
    let session = StorySession::with_client(client);
    info!(config = %cli.config.display(), max_retries = cli.max_retries, "starting story writer");

    if cli.headless {
        let stdin = io::stdin();
        return headless::run_headless(session, stdin.lock(), io::stdout())
            .await
            .map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Startup check: the configuration must load and look usable.
fn check_configuration(provider: &FileConfig) -> Result<(), ConfigError> {
    use story_core::ConfigProvider;

    let config = provider.load()?;
    config.validate()
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so in that mode logs go to a file instead.
fn init_tracing(headless: bool) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        None
    } else {
        let appender = tracing_appender::rolling::never(".", LOG_FILE);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Some(guard)
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        let size = terminal.size()?;
        app.set_viewports(pane_viewports(Rect::new(0, 0, size.width, size.height)));
        terminal.draw(|f| render(f, &app))?;

        // Draw the in-flight state before awaiting the generation
        if let Some(action) = app.take_pending() {
            app.start(&action);
            terminal.draw(|f| render(f, &app))?;
            app.run_action(action).await;
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::Run(action) => app.queue(action),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
