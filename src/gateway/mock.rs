// src/gateway/mock.rs

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::gateway::{CompletionClient, GatewayError, Prompt};

/// Completion client that replays queued responses in order and records every
/// prompt it receives.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<Prompt>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.responses.get_mut().push_back(Ok(text.into()));
        self
    }

    pub fn fail(mut self, error: GatewayError) -> Self {
        self.responses.get_mut().push_back(Err(error));
        self
    }

    /// Waits this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: Prompt) -> Result<String, GatewayError> {
        self.prompts.lock().await.push(prompt);
        // Take the response before sleeping so concurrent callers keep queue order.
        let next = self.responses.lock().await.pop_front();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        next.unwrap_or_else(|| Err(GatewayError::Http("no scripted response left".to_string())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
