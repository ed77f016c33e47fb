// src/gateway/mod.rs

//! Generation Gateway: the single capability object through which every model
//! call goes. Raw model text is sanitized, parsed and shape-checked here before
//! anything reaches session state.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    error::AppError,
    models::{feedback::ModelFeedback, question::QuizQuestion},
};

pub mod gemini;
pub mod mock;
pub mod prompts;
pub mod sanitize;

pub use gemini::GeminiClient;
pub use mock::ScriptedClient;
pub use sanitize::sanitize;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Request timed out")]
    Timeout,
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
    #[error("Response contained no text")]
    Empty,
}

/// One request to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system_instruction: Option<String>,
    pub text: String,
    /// Ask the service for a JSON response body.
    pub json: bool,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            text: text.into(),
            json: false,
        }
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self {
            json: true,
            ..Self::text(text)
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Low-level completion service. Implementors return the raw model text.
#[async_trait]
pub trait CompletionClient: Send + Sync + Debug {
    async fn complete(&self, prompt: Prompt) -> Result<String, GatewayError>;

    fn model(&self) -> &str;
}

/// Study operations built on a [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct ModelGateway {
    client: Arc<dyn CompletionClient>,
    question_count: usize,
}

impl ModelGateway {
    pub fn new(client: Arc<dyn CompletionClient>, question_count: usize) -> Self {
        Self {
            client,
            question_count,
        }
    }

    /// Generates a validated, non-empty question set from free-form notes.
    #[instrument(skip_all, fields(model = %self.client.model(), notes_len = notes.len()))]
    pub async fn generate_quiz(&self, notes: &str) -> Result<Vec<QuizQuestion>, AppError> {
        let raw = self
            .client
            .complete(prompts::generate_quiz(notes, self.question_count))
            .await?;
        let value = parse_json(&raw)?;

        let list = unwrap_list(value, "questions")
            .ok_or_else(|| AppError::malformed("expected a `questions` array", raw.as_str()))?;
        let questions: Vec<QuizQuestion> = decode(list, &raw)?;

        if questions.is_empty() {
            return Err(AppError::malformed("quiz contained no questions", raw));
        }
        info!(count = questions.len(), "Quiz generated");
        Ok(questions)
    }

    /// Produces a Markdown summary. Accepts plain text or `{"summary": ...}`.
    #[instrument(skip_all, fields(model = %self.client.model(), text_len = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String, AppError> {
        let raw = self.client.complete(prompts::summarize(text)).await?;
        let cleaned = sanitize(&raw);

        let summary = match serde_json::from_str::<Value>(&cleaned) {
            Ok(Value::Object(map)) => match map.get("summary") {
                Some(Value::String(s)) => s.trim().to_string(),
                _ => return Err(AppError::malformed("object without a `summary` string", raw)),
            },
            _ => cleaned,
        };

        if summary.is_empty() {
            return Err(AppError::malformed("summary was empty", raw));
        }
        info!(summary_len = summary.len(), "Summary generated");
        Ok(summary)
    }

    /// Lists distinct topic names, in first-seen order.
    #[instrument(skip_all, fields(model = %self.client.model(), text_len = text.len()))]
    pub async fn extract_topics(&self, text: &str) -> Result<Vec<String>, AppError> {
        let raw = self.client.complete(prompts::extract_topics(text)).await?;
        let value = parse_json(&raw)?;

        let list = unwrap_list(value, "topics")
            .ok_or_else(|| AppError::malformed("expected a `topics` array", raw.as_str()))?;
        let names: Vec<String> = decode(list, &raw)?;

        let mut topics: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if !name.is_empty() && !topics.iter().any(|t| t == name) {
                topics.push(name.to_string());
            }
        }
        info!(count = topics.len(), "Topics extracted");
        Ok(topics)
    }

    /// Asks the model to grade an attempt. The result must be checked against
    /// the local score before use (see `quiz::feedback::reconcile`).
    #[instrument(skip_all, fields(model = %self.client.model(), questions = questions.len()))]
    pub async fn score_quiz(
        &self,
        questions: &[QuizQuestion],
        answers: &BTreeMap<usize, String>,
    ) -> Result<ModelFeedback, AppError> {
        let raw = self
            .client
            .complete(prompts::score_quiz(questions, answers))
            .await?;
        let feedback: ModelFeedback = decode(parse_json(&raw)?, &raw)?;

        if feedback.feedback.len() != questions.len() {
            return Err(AppError::malformed(
                format!(
                    "expected {} feedback items, found {}",
                    questions.len(),
                    feedback.feedback.len()
                ),
                raw,
            ));
        }
        Ok(feedback)
    }

    /// Free-form tutoring reply (Markdown).
    #[instrument(skip_all, fields(model = %self.client.model(), message_len = message.len()))]
    pub async fn chat(
        &self,
        message: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, AppError> {
        let raw = self
            .client
            .complete(prompts::chat(message, system_instruction))
            .await?;
        let reply = raw.trim();
        if reply.is_empty() {
            return Err(AppError::malformed("chat reply was empty", raw.as_str()));
        }
        debug!(reply_len = reply.len(), "Chat reply received");
        Ok(reply.to_string())
    }
}

fn parse_json(raw: &str) -> Result<Value, AppError> {
    serde_json::from_str(&sanitize(raw))
        .map_err(|e| AppError::malformed(format!("invalid JSON: {}", e), raw))
}

fn decode<T: DeserializeOwned>(value: Value, raw: &str) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::malformed(format!("unexpected shape: {}", e), raw))
}

/// Accepts either `{"<field>": [...]}` or a bare array.
fn unwrap_list(value: Value, field: &str) -> Option<Value> {
    match value {
        Value::Array(_) => Some(value),
        Value::Object(mut map) => match map.remove(field) {
            Some(list @ Value::Array(_)) => Some(list),
            _ => None,
        },
        _ => None,
    }
}
