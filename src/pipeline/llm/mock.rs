use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::LlmClient;
use super::LlmError;

#[derive(Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Scripted model client for tests. Replies are served in order; once the
/// script is exhausted the fallback reply repeats. Every prompt is captured.
pub struct MockLlmClient {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// Always reply with `response`.
    pub fn new(response: &str) -> Self {
        Self::build(VecDeque::new(), MockReply::Text(response.to_string()))
    }

    /// Reply with each response in turn, then fail.
    pub fn sequence(responses: &[&str]) -> Self {
        let script = responses
            .iter()
            .map(|r| MockReply::Text(r.to_string()))
            .collect();
        Self::build(script, MockReply::Fail)
    }

    /// Every call fails as if the endpoint were unreachable.
    pub fn failing() -> Self {
        Self::build(VecDeque::new(), MockReply::Fail)
    }

    fn build(script: VecDeque<MockReply>, fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(script),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let reply = self
            .script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail => Err(LlmError::Connection("mock://unreachable".into())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
