//! Deterministic completion client for tests: returns queued responses in
//! order, records every call, and fails when the queue runs dry.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::CompletionClient;

#[derive(Debug, Default)]
pub struct CannedClient {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl CannedClient {
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Remaining queued responses (useful for asserting call counts).
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Every `(system_prompt, user_content)` pair seen so far, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        self.calls
            .lock()
            .map_err(|_| anyhow!("canned call log poisoned"))?
            .push((system_prompt.to_string(), user_content.to_string()));

        self.responses
            .lock()
            .map_err(|_| anyhow!("canned response queue poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("canned response queue exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_client_pops_in_order() {
        let client = CannedClient::new(vec!["first", "second"]);
        assert_eq!(client.complete("s", "u").await.unwrap(), "first");
        assert_eq!(client.complete("s", "u2").await.unwrap(), "second");
        assert!(client.complete("s", "u3").await.is_err());
        assert_eq!(client.remaining(), 0);
        // Calls are recorded even when the queue is exhausted.
        assert_eq!(client.calls().len(), 3);
        assert_eq!(client.calls()[1].1, "u2");
    }
}
