//! End-to-end generation tests against a scripted backend.
//!
//! Backoff sleeps run on tokio's paused clock, so the elapsed virtual time
//! is exactly the sum of the delays taken.

use std::time::Duration;
use story_core::{
    ConfigError, Configuration, FileConfig, GenerationClient, GenerationError, MockBackend,
    MockReply, RawFallback, Role, SessionError, StaticConfig, StoryAgents, StorySession,
    APOLOGY_MESSAGE, AUTH_FAILURE_MESSAGE,
};
use tempfile::TempDir;
use tokio::time::Instant;

fn valid_config() -> StaticConfig {
    StaticConfig(Configuration::new("AIzaSyExample123", "gemini-2.0-flash"))
}

fn client(backend: &MockBackend) -> GenerationClient {
    GenerationClient::new(valid_config(), backend.clone())
}

/// The shell treats these prefixes as failures.
fn looks_like_failure(text: &str) -> bool {
    text.starts_with("Error:") || text.starts_with("I apologize")
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success() {
    let backend = MockBackend::new(vec![MockReply::text("Rex spread his ears and flew.")]);
    let start = Instant::now();

    let text = client(&backend).generate("a flying dog").await.unwrap();

    assert_eq!(text, "Rex spread his ears and flew.");
    assert!(!looks_like_failure(&text));
    assert_eq!(backend.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_key_stops_immediately() {
    let backend = MockBackend::always(MockReply::api_error(
        400,
        "INVALID_ARGUMENT: API key not valid. Please pass a valid API key.",
    ));
    let start = Instant::now();

    let err = client(&backend).generate("a flying dog").await.unwrap_err();

    assert!(matches!(err, GenerationError::AuthenticationFailure { .. }));
    assert_eq!(err.to_string(), AUTH_FAILURE_MESSAGE);
    assert!(looks_like_failure(&err.to_string()));
    assert_eq!(backend.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_forbidden_status_is_authentication() {
    let backend = MockBackend::always(MockReply::api_error(403, "PERMISSION_DENIED"));

    let err = client(&backend).generate("prompt").await.unwrap_err();

    assert!(matches!(err, GenerationError::AuthenticationFailure { .. }));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_backoff_then_success() {
    let backend = MockBackend::new(vec![
        MockReply::api_error(429, "RESOURCE_EXHAUSTED: Quota exceeded"),
        MockReply::api_error(429, "RESOURCE_EXHAUSTED: Quota exceeded"),
        MockReply::text("Third time lucky."),
    ]);
    let start = Instant::now();

    let text = client(&backend).generate("prompt").await.unwrap();

    assert_eq!(text, "Third time lucky.");
    assert_eq!(backend.calls(), 3);
    // 5s after the first failure, 10s after the second
    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_exhaust_retries() {
    let backend = MockBackend::always(MockReply::network_error("connection reset by peer"));
    let start = Instant::now();

    let err = client(&backend).generate("prompt").await.unwrap_err();

    match &err {
        GenerationError::RetriesExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(*attempts, 3);
            assert!(last_error.contains("connection reset by peer"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(err.to_string(), APOLOGY_MESSAGE);
    assert_eq!(backend.calls(), 3);
    // 2s after every failed attempt, the last one included
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_mixed_failures() {
    let backend = MockBackend::new(vec![
        MockReply::api_error(503, "UNAVAILABLE: model overloaded"),
        MockReply::api_error(429, "Rate limit reached"),
        MockReply::text("Done."),
    ]);
    let start = Instant::now();

    let text = client(&backend).generate("prompt").await.unwrap();

    assert_eq!(text, "Done.");
    // 2s transient, then 10s for a rate limit on the second attempt
    assert_eq!(start.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_count() {
    let backend = MockBackend::always(MockReply::api_error(500, "INTERNAL"));

    let err = client(&backend)
        .with_max_retries(5)
        .generate("prompt")
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::RetriesExhausted { attempts: 5, .. }));
    assert_eq!(backend.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_per_call_retry_budget() {
    let backend = MockBackend::always(MockReply::api_error(500, "INTERNAL"));
    let client = client(&backend);

    let err = client.generate_with_retries("prompt", 1).await.unwrap_err();

    assert!(matches!(err, GenerationError::RetriesExhausted { attempts: 1, .. }));
    assert_eq!(backend.calls(), 1);
    assert_eq!(client.max_retries(), 3);
}

#[tokio::test]
async fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let backend = MockBackend::new(vec![MockReply::text("unused")]);
    let client =
        GenerationClient::new(FileConfig::new(dir.path().join("config.toml")), backend.clone());

    let err = client.generate("prompt").await.unwrap_err();

    assert!(matches!(err, GenerationError::Config(ConfigError::NotFound { .. })));
    assert!(err.to_string().starts_with("Configuration error: Config file not found at:"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_malformed_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_key = [unclosed").unwrap();
    let backend = MockBackend::new(vec![MockReply::text("unused")]);

    let err = GenerationClient::new(FileConfig::new(&path), backend.clone())
        .generate("prompt")
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Config(ConfigError::Malformed { .. })));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_config_reloaded_per_call() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "api_key = \"AIzaSyFirst0000\"\nmodel_name = \"gemini-2.0-flash\"\n")
        .unwrap();

    let backend = MockBackend::always(MockReply::text("ok"));
    let client = GenerationClient::new(FileConfig::new(&path), backend.clone());

    client.generate("one").await.unwrap();
    std::fs::write(&path, "api_key = \"AIzaSySecond000\"\nmodel_name = \"gemini-1.5-pro\"\n")
        .unwrap();
    client.generate("two").await.unwrap();

    assert_eq!(backend.models(), vec!["gemini-2.0-flash", "gemini-1.5-pro"]);
}

#[tokio::test]
async fn test_editor_prompt_is_deterministic() {
    let backend = MockBackend::always(MockReply::text("feedback"));
    let agents = StoryAgents::new(client(&backend));

    agents.provide_feedback("The cat sat.").await.unwrap();
    agents.provide_feedback("The cat sat.").await.unwrap();

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
    assert_eq!(prompts[0], Role::editor().render("The cat sat."));
}

#[tokio::test]
async fn test_roles_return_client_result_unmodified() {
    let backend = MockBackend::new(vec![
        MockReply::text("story"),
        MockReply::text("feedback"),
        MockReply::text("analysis"),
    ]);
    let agents = StoryAgents::new(client(&backend));

    assert_eq!(agents.generate_story("p").await.unwrap(), "story");
    assert_eq!(agents.provide_feedback("t").await.unwrap(), "feedback");
    assert_eq!(agents.provide_analysis("t").await.unwrap(), "analysis");

    let prompts = backend.prompts();
    assert!(prompts[0].starts_with("Write a creative short story"));
    assert!(prompts[1].starts_with("Please provide detailed editorial feedback"));
    assert!(prompts[2].starts_with("Please provide a thoughtful literary analysis"));
}

#[tokio::test(start_paused = true)]
async fn test_session_keeps_story_after_failure() {
    let backend = MockBackend::new(vec![MockReply::text("The first story.")])
        .with_fallback(MockReply::api_error(400, "API key not valid"));
    let mut session = StorySession::with_client(client(&backend));

    session.generate_story("first").await.unwrap();
    let err = session.generate_story("second").await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Generation(GenerationError::AuthenticationFailure { .. })
    ));
    assert_eq!(session.story(), Some("The first story."));
}

#[tokio::test(start_paused = true)]
async fn test_reject_raw_fallback_exhausts_on_blocked_prompts() {
    let blocked = gemini_blocked_response();
    let backend = MockBackend::always(MockReply::response(blocked));

    let err = client(&backend)
        .with_raw_fallback(RawFallback::Reject)
        .generate("prompt")
        .await
        .unwrap_err();

    match err {
        GenerationError::RetriesExhausted { last_error, .. } => {
            assert!(last_error.contains("response contained no text"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(backend.calls(), 3);
}

fn gemini_blocked_response() -> gemini::Response {
    gemini::Response::from_json(serde_json::json!({
        "promptFeedback": { "blockReason": "SAFETY" }
    }))
    .unwrap()
}

#[tokio::test]
async fn test_empty_reply_is_never_a_story() {
    let backend = MockBackend::always(MockReply::text(""));
    let mut session = StorySession::with_client(client(&backend));

    let story = session.generate_story("a flying dog").await.unwrap();

    assert!(!story.trim().is_empty());
    assert_eq!(session.story(), Some(story.as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_blank_reply_retried_when_rejected() {
    let backend = MockBackend::new(vec![
        MockReply::text("   "),
        MockReply::text("Rex flew at last."),
    ]);
    let start = Instant::now();

    let text = client(&backend)
        .with_raw_fallback(RawFallback::Reject)
        .generate("a flying dog")
        .await
        .unwrap();

    assert_eq!(text, "Rex flew at last.");
    assert_eq!(backend.calls(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_session_ignores_blank_stories_when_rejected() {
    let backend = MockBackend::always(MockReply::text(""));
    let mut session = StorySession::with_client(
        client(&backend).with_raw_fallback(RawFallback::Reject),
    );

    let err = session.generate_story("a flying dog").await.unwrap_err();

    assert_eq!(err.to_string(), APOLOGY_MESSAGE);
    assert!(!session.has_story());
    assert_eq!(backend.calls(), 3);
}
