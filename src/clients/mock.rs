//! Scriptable mock completion client for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clients::CompletionClient;
use crate::error::CompletionError;

/// Shared handle for scripting a `MockClient` and inspecting what it saw.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockHandle {
    /// Queue a raw text response.
    pub fn push_text(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response.
    pub fn push_error(&self, error: CompletionError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Number of completion calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All (system, user) prompt pairs seen, in order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Mock client that replays scripted responses. With an empty script it answers
/// with an empty JSON object.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }

    /// Convenience: a client that always returns the given text.
    pub fn with_text(text: impl Into<String>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.push_text(text);
        (client, handle)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, system: String, user: String) -> Result<String, CompletionError> {
        self.handle.calls.fetch_add(1, Ordering::SeqCst);
        self.handle.prompts.lock().unwrap().push((system, user));
        match self.handle.responses.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok("{}".to_string()),
        }
    }

    fn clone_box(&self) -> Box<dyn CompletionClient> {
        Box::new(self.clone())
    }
}
