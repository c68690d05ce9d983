//! Writer, editor and reviewer agents over the Gemini API.
//!
//! This crate provides:
//! - Configuration loading from a TOML file, re-read on every request
//! - A retrying generation client with error classification and backoff
//! - Role templates for story writing, editorial feedback and literary review
//! - A session holding the current story
//!
//! # Quick Start
//!
//! ```ignore
//! use story_core::{GenerationClient, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GenerationClient::gemini("config/config.toml");
//!     let mut session = StorySession::with_client(client);
//!
//!     let story = session.generate_story("a dog who learns to fly").await?;
//!     println!("{story}");
//!
//!     let feedback = session.provide_feedback().await?;
//!     println!("{feedback}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod generation;
pub mod roles;
pub mod session;
pub mod testing;

pub use config::{
    load_config, ConfigError, ConfigProvider, Configuration, FileConfig, StaticConfig,
    DEFAULT_CONFIG_PATH, SAMPLE_CONFIG,
};
pub use generation::{
    BackoffPolicy, FailureClass, GeminiBackend, GenerationClient, GenerationError,
    GenerationParameters, RawFallback, TextBackend, APOLOGY_MESSAGE, AUTH_FAILURE_MESSAGE,
    DEFAULT_MAX_RETRIES,
};
pub use roles::{Role, StoryAgents};
pub use session::{SessionError, StorySession};
pub use testing::{MockBackend, MockReply};
