//! Testing utilities.
//!
//! [`MockBackend`] stands in for the Gemini API with scripted replies and
//! records every request it receives.

use crate::config::Configuration;
use crate::generation::TextBackend;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One scripted backend outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(gemini::Response),
    ApiError { status: u16, message: String },
    NetworkError(String),
}

impl MockReply {
    /// A plain single-candidate text response.
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Response(gemini::Response::from_text(text))
    }

    pub fn response(response: gemini::Response) -> Self {
        MockReply::Response(response)
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        MockReply::ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        MockReply::NetworkError(message.into())
    }

    fn into_result(self) -> Result<gemini::Response, gemini::Error> {
        match self {
            MockReply::Response(response) => Ok(response),
            MockReply::ApiError { status, message } => Err(gemini::Error::Api { status, message }),
            MockReply::NetworkError(message) => Err(gemini::Error::Network(message)),
        }
    }
}

#[derive(Default)]
struct MockState {
    script: VecDeque<MockReply>,
    fallback: Option<MockReply>,
    requests: Vec<gemini::Request>,
    models: Vec<String>,
}

/// A backend that replays scripted replies in order.
///
/// Clones share state, so a test can keep a handle after moving a clone
/// into a client. Once the script runs out the fallback reply is repeated,
/// or a network error is returned if there is none.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                script: replies.into(),
                ..MockState::default()
            })),
        }
    }

    /// A backend that gives the same reply forever.
    pub fn always(reply: MockReply) -> Self {
        Self::new(Vec::new()).with_fallback(reply)
    }

    pub fn with_fallback(self, reply: MockReply) -> Self {
        self.lock().fallback = Some(reply);
        self
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<gemini::Request> {
        self.lock().requests.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    /// Model names seen in the configuration of each call.
    pub fn models(&self) -> Vec<String> {
        self.lock().models.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    async fn generate_content(
        &self,
        config: &Configuration,
        request: gemini::Request,
    ) -> Result<gemini::Response, gemini::Error> {
        let mut state = self.lock();
        state.requests.push(request);
        state.models.push(config.model_name.clone());

        let reply = match state.script.pop_front() {
            Some(reply) => reply,
            None => state
                .fallback
                .clone()
                .unwrap_or_else(|| MockReply::network_error("mock backend has no more replies")),
        };
        reply.into_result()
    }
}
