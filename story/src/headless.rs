//! Headless mode for the story writer.
//!
//! A line-oriented interface without a TUI, for scripting and automated
//! testing:
//! - plain lines are story prompts
//! - lines starting with `#` are commands (edit, review, story, help, quit)
//! - output sections are tagged `[STORY]`, `[EDITOR]`, `[REVIEWER]`, `[ERROR]`

use std::io::{self, BufRead, Write};

use story_core::{SessionError, StorySession};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Prompt(&'a str),
    Edit,
    Review,
    Story,
    Agents,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a trimmed, non-empty line
    pub fn parse(line: &'a str) -> Self {
        let Some(command) = line.strip_prefix('#') else {
            return Command::Prompt(line);
        };

        match command.trim() {
            "edit" | "feedback" => Command::Edit,
            "review" | "analysis" => Command::Review,
            "story" => Command::Story,
            "agents" => Command::Agents,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other),
        }
    }
}

const HELP: &str = "\
  <prompt>  - Generate a story from the prompt
  #edit     - Editor feedback on the current story
  #review   - Reviewer analysis of the current story
  #story    - Show the current story
  #agents   - Describe the writer, editor and reviewer
  #help     - Show this help
  #quit     - Exit";

/// Run the session over a line protocol until input ends or `#quit`.
pub async fn run_headless<R: BufRead, W: Write>(
    mut session: StorySession,
    input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "=== Story Writer Headless Mode ===")?;
    writeln!(out, "Commands:")?;
    writeln!(out, "{HELP}")?;
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match Command::parse(line) {
            Command::Quit => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            Command::Help => {
                writeln!(out, "[HELP]")?;
                writeln!(out, "{HELP}")?;
            }
            Command::Story => match session.story() {
                Some(story) => write_section(&mut out, "[STORY]", story)?,
                None => writeln!(out, "[ERROR] {}", SessionError::NoStory)?,
            },
            Command::Agents => {
                writeln!(out, "[AGENTS]")?;
                let agents = session.agents();
                for role in [agents.writer(), agents.editor(), agents.reviewer()] {
                    writeln!(out, "{}: {}", role.name, role.default_system_message)?;
                }
                writeln!(out)?;
            }
            Command::Prompt(prompt) => {
                let result = session.generate_story(prompt).await;
                write_result(&mut out, "[STORY]", "Failed to generate story", result)?;
            }
            Command::Edit => {
                let result = session.provide_feedback().await;
                write_result(&mut out, "[EDITOR]", "Failed to get editor feedback", result)?;
            }
            Command::Review => {
                let result = session.provide_analysis().await;
                write_result(&mut out, "[REVIEWER]", "Failed to get reviewer analysis", result)?;
            }
            Command::Unknown(other) => {
                writeln!(out, "[ERROR] Unknown command: #{other}. Type #help for help.")?;
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn write_result<W: Write>(
    out: &mut W,
    tag: &str,
    failure: &str,
    result: Result<String, SessionError>,
) -> io::Result<()> {
    match result {
        Ok(text) => write_section(out, tag, &text),
        Err(e) => writeln!(out, "[ERROR] {failure}: {e}"),
    }
}

fn write_section<W: Write>(out: &mut W, tag: &str, text: &str) -> io::Result<()> {
    writeln!(out, "{tag}")?;
    writeln!(out, "{}", text.trim_end())?;
    writeln!(out)
}
