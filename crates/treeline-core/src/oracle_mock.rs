//! Mock summarization oracle for testing.
//!
//! Returns deterministic responses based on configured prompt fragments,
//! records call history for verification, and can inject failures or empty
//! responses to exercise the placeholder fallback paths.

use crate::error::{Error, Result};
use crate::traits::SummaryOracle;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Behavior of the mock for a matched prompt.
#[derive(Debug, Clone)]
enum Response {
    Text(String),
    Empty,
    Failure(String),
}

/// Deterministic [`SummaryOracle`] for tests.
pub struct MockOracle {
    /// Ordered (fragment, response) pairs; first fragment contained in the
    /// prompt wins.
    responses: Mutex<Vec<(String, Response)>>,
    /// Response when no fragment matches.
    default_response: String,
    /// Prompts received, in call order.
    calls: Mutex<Vec<String>>,
}

impl MockOracle {
    /// Create a mock that answers every prompt with a generic summary.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            default_response: "A mock summary.".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock with a custom default response.
    pub fn with_default_response(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            ..Self::new()
        }
    }

    /// Answer prompts containing `fragment` with `response`.
    pub fn respond_to(&self, fragment: &str, response: &str) {
        self.responses
            .lock()
            .push((fragment.to_string(), Response::Text(response.to_string())));
    }

    /// Answer prompts containing `fragment` with an empty string.
    pub fn respond_empty_to(&self, fragment: &str) {
        self.responses
            .lock()
            .push((fragment.to_string(), Response::Empty));
    }

    /// Fail prompts containing `fragment`.
    pub fn fail_on(&self, fragment: &str, message: &str) {
        self.responses
            .lock()
            .push((fragment.to_string(), Response::Failure(message.to_string())));
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of prompts received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryOracle for MockOracle {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        self.calls.lock().push(prompt.to_string());

        let matched = self
            .responses
            .lock()
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone());

        match matched {
            Some(Response::Text(text)) => Ok(text),
            Some(Response::Empty) => Ok(String::new()),
            Some(Response::Failure(message)) => Err(Error::Oracle(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn configured_fragment_wins_over_default() {
        let oracle = MockOracle::new();
        oracle.respond_to("main.rs", "entry point");

        assert_eq!(
            oracle.summarize("summarize main.rs please").await.unwrap(),
            "entry point"
        );
        assert_eq!(
            oracle.summarize("something else").await.unwrap(),
            "A mock summary."
        );
    }

    #[tokio::test]
    async fn failure_injection_returns_error() {
        let oracle = MockOracle::new();
        oracle.fail_on("broken", "rate limited");

        let err = oracle.summarize("broken prompt").await.unwrap_err();
        assert!(matches!(err, Error::Oracle(_)));
    }

    #[tokio::test]
    async fn call_history_is_recorded_in_order() {
        let oracle = MockOracle::new();
        oracle.summarize("first").await.unwrap();
        oracle.summarize("second").await.unwrap();

        assert_eq!(oracle.calls(), vec!["first", "second"]);
        assert_eq!(oracle.call_count(), 2);
    }
}
